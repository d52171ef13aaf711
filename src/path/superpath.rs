//! Paths as chains of cubic nodes.
//!
//! Every segment of a [`CubicSuperPath`] is a cubic bezier, written as a node
//! with the handle leading into it and the handle leaving it. Straight
//! segments have retracted handles (equal to their node). Closing is a flag
//! on the subpath; the closing segment runs from the last node back to the
//! first.

use std::fmt;

use glam::dvec2;

use super::command::{CubicCurve, PathCommand, Segment, reflect};
use super::Path;
use crate::transform::Transform;
use crate::types::{Vector, VectorExt};

/// A bezier node with its two handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicNode {
    pub incoming: Vector,
    pub point: Vector,
    pub outgoing: Vector,
}

impl CubicNode {
    /// Node with both handles retracted.
    pub fn corner(point: Vector) -> Self {
        Self {
            incoming: point,
            point,
            outgoing: point,
        }
    }

    pub fn transformed(&self, t: &Transform) -> Self {
        Self {
            incoming: t.apply_to_point(self.incoming),
            point: t.apply_to_point(self.point),
            outgoing: t.apply_to_point(self.outgoing),
        }
    }

    pub fn to_triple(&self) -> [Vector; 3] {
        [self.incoming, self.point, self.outgoing]
    }
}

/// One continuous run of nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubPath {
    pub nodes: Vec<CubicNode>,
    pub closed: bool,
}

impl SubPath {
    pub fn starting_at(point: Vector) -> Self {
        Self {
            nodes: vec![CubicNode::corner(point)],
            closed: false,
        }
    }

    /// Append a cubic drawn from the current last node.
    pub fn push_curve(&mut self, curve: &CubicCurve) {
        if let Some(last) = self.nodes.last_mut() {
            last.outgoing = curve.ctrl1;
        }
        self.nodes.push(CubicNode {
            incoming: curve.ctrl2,
            point: curve.to,
            outgoing: curve.to,
        });
    }

    /// Bezier segments as `[start, ctrl1, ctrl2, end]`, the closing segment included.
    pub fn segments(&self) -> Vec<[Vector; 4]> {
        let mut out: Vec<[Vector; 4]> = self
            .nodes
            .windows(2)
            .map(|pair| segment_between(&pair[0], &pair[1]))
            .collect();
        if let (true, Some(first), Some(last)) = (self.closed, self.nodes.first(), self.nodes.last()) {
            if self.nodes.len() > 1 {
                out.push(segment_between(last, first));
            }
        }
        out
    }
}

fn segment_between(from: &CubicNode, to: &CubicNode) -> [Vector; 4] {
    [from.point, from.outgoing, to.incoming, to.point]
}

/// A path rebuilt from cubic segments only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CubicSuperPath {
    pub subpaths: Vec<SubPath>,
}

impl CubicSuperPath {
    /// Convert any path; lines, quadratics and arcs all become cubics.
    pub fn from_path(path: &Path) -> Self {
        let mut subpaths = Vec::new();
        let mut current: Option<SubPath> = None;

        for (pen, command) in path.walk() {
            let previous = pen.previous;
            let curves = match command.absolute_segment(previous) {
                Segment::Move { to } => {
                    subpaths.extend(current.take());
                    current = Some(SubPath::starting_at(to));
                    continue;
                }
                Segment::Close => {
                    if let Some(mut subpath) = current.take() {
                        subpath.closed = true;
                        subpaths.push(subpath);
                    }
                    continue;
                }
                Segment::Line { to } => vec![CubicCurve::line(previous, to)],
                Segment::Horizontal { x } => vec![CubicCurve::line(previous, dvec2(x, previous.y))],
                Segment::Vertical { y } => vec![CubicCurve::line(previous, dvec2(previous.x, y))],
                Segment::Cubic { ctrl1, ctrl2, to } => vec![CubicCurve { ctrl1, ctrl2, to }],
                Segment::SmoothCubic { ctrl2, to } => vec![CubicCurve {
                    ctrl1: reflect(pen.previous_control, previous),
                    ctrl2,
                    to,
                }],
                Segment::Quadratic { ctrl, to } => {
                    vec![CubicCurve::from_quadratic(previous, ctrl, to)]
                }
                Segment::SmoothQuadratic { to } => {
                    let ctrl = reflect(pen.previous_control, previous);
                    vec![CubicCurve::from_quadratic(previous, ctrl, to)]
                }
                Segment::Arc(arc) => arc.to_curves(previous),
            };
            // drawing without a move continues from the pen position
            let subpath = current.get_or_insert_with(|| SubPath::starting_at(previous));
            for curve in &curves {
                subpath.push_curve(curve);
            }
        }
        subpaths.extend(current);
        Self { subpaths }
    }

    /// Whether the segment from `previous` to `node` is straight.
    pub fn is_line(previous: &CubicNode, node: &CubicNode) -> bool {
        previous.point.is_close(previous.outgoing) && node.incoming.is_close(node.point)
    }

    /// Back to path commands, all absolute.
    ///
    /// Straight segments become `L` unless `curves_only` is set. A closed
    /// subpath ends in `Z`, preceded by an explicit closing segment when that
    /// segment is curved (or when `curves_only` asks for it).
    pub fn to_path(&self, curves_only: bool) -> Path {
        let mut out = Path::new();
        for subpath in &self.subpaths {
            let Some(first) = subpath.nodes.first() else {
                continue;
            };
            out.push(PathCommand::Absolute(Segment::Move { to: first.point }));
            for pair in subpath.nodes.windows(2) {
                out.push(Self::segment_command(&pair[0], &pair[1], curves_only));
            }
            if subpath.closed {
                if let Some(last) = subpath.nodes.last() {
                    let returned = last.point.is_close(first.point);
                    if !returned && (curves_only || !Self::is_line(last, first)) {
                        out.push(Self::segment_command(last, first, true));
                    }
                }
                out.push(PathCommand::Absolute(Segment::Close));
            }
        }
        out
    }

    fn segment_command(previous: &CubicNode, node: &CubicNode, curves_only: bool) -> PathCommand {
        if !curves_only && Self::is_line(previous, node) {
            PathCommand::Absolute(Segment::Line { to: node.point })
        } else {
            PathCommand::Absolute(Segment::Cubic {
                ctrl1: previous.outgoing,
                ctrl2: node.incoming,
                to: node.point,
            })
        }
    }

    /// Nested `[incoming, node, outgoing]` triples. Closed subpaths repeat
    /// their first triple at the end to spell out the closing segment.
    pub fn to_triples(&self) -> Vec<Vec<[Vector; 3]>> {
        self.subpaths
            .iter()
            .map(|subpath| {
                let mut triples: Vec<[Vector; 3]> =
                    subpath.nodes.iter().map(CubicNode::to_triple).collect();
                if let (true, Some(first)) = (subpath.closed, subpath.nodes.first()) {
                    triples.push(first.to_triple());
                }
                triples
            })
            .collect()
    }

    /// Apply `t` to every node and handle.
    pub fn transform(&self, t: &Transform) -> CubicSuperPath {
        CubicSuperPath {
            subpaths: self
                .subpaths
                .iter()
                .map(|subpath| SubPath {
                    nodes: subpath.nodes.iter().map(|n| n.transformed(t)).collect(),
                    closed: subpath.closed,
                })
                .collect(),
        }
    }

    /// Every bezier segment of every subpath.
    pub fn segments(&self) -> impl Iterator<Item = [Vector; 4]> + '_ {
        self.subpaths.iter().flat_map(SubPath::segments)
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }
}

impl From<&Path> for CubicSuperPath {
    fn from(path: &Path) -> Self {
        Self::from_path(path)
    }
}

impl fmt::Display for CubicSuperPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_path(false), f)
    }
}
