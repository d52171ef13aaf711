//! Path commands: one drawing instruction, absolute or relative.
//!
//! A [`Segment`] holds the numbers of an instruction. Wrapped in
//! [`PathCommand::Absolute`] they are coordinates; wrapped in
//! [`PathCommand::Relative`] they are deltas from the previous end point.
//! Everything that depends on the drawing so far (end points, implied control
//! points, bounds) reads it from a [`PenState`].

use std::fmt;

use glam::dvec2;

use super::PenState;
use super::arc::arc_to_path;
use crate::bounds::{BoundingBox, BoundingInterval, cubic_extrema, quadratic_extrema};
use crate::errors::GeometryError;
use crate::format::FormatOptions;
use crate::log::debug;
use crate::transform::Transform;
use crate::types::Vector;

// ============================================================================
// Command kinds
// ============================================================================

/// The ten SVG drawing instructions, without their relativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Move,
    Line,
    Horizontal,
    Vertical,
    Cubic,
    SmoothCubic,
    Quadratic,
    SmoothQuadratic,
    Arc,
    Close,
}

impl CommandKind {
    /// Kind and relativity (`true` for lowercase) of a path data letter.
    pub fn from_letter(letter: char) -> Option<(CommandKind, bool)> {
        let kind = match letter.to_ascii_uppercase() {
            'M' => CommandKind::Move,
            'L' => CommandKind::Line,
            'H' => CommandKind::Horizontal,
            'V' => CommandKind::Vertical,
            'C' => CommandKind::Cubic,
            'S' => CommandKind::SmoothCubic,
            'Q' => CommandKind::Quadratic,
            'T' => CommandKind::SmoothQuadratic,
            'A' => CommandKind::Arc,
            'Z' => CommandKind::Close,
            _ => return None,
        };
        Some((kind, letter.is_ascii_lowercase()))
    }

    pub fn letter(self, relative: bool) -> char {
        let upper = match self {
            CommandKind::Move => 'M',
            CommandKind::Line => 'L',
            CommandKind::Horizontal => 'H',
            CommandKind::Vertical => 'V',
            CommandKind::Cubic => 'C',
            CommandKind::SmoothCubic => 'S',
            CommandKind::Quadratic => 'Q',
            CommandKind::SmoothQuadratic => 'T',
            CommandKind::Arc => 'A',
            CommandKind::Close => 'Z',
        };
        if relative { upper.to_ascii_lowercase() } else { upper }
    }

    /// Numbers consumed per segment.
    pub fn arity(self) -> usize {
        match self {
            CommandKind::Close => 0,
            CommandKind::Horizontal | CommandKind::Vertical => 1,
            CommandKind::Move | CommandKind::Line | CommandKind::SmoothQuadratic => 2,
            CommandKind::SmoothCubic | CommandKind::Quadratic => 4,
            CommandKind::Cubic => 6,
            CommandKind::Arc => 7,
        }
    }

    /// Command implied when more arguments follow a complete segment.
    ///
    /// Extra pairs after a move are line-tos; numbers after a close start a
    /// new absolute move.
    pub fn next(self, relative: bool) -> (CommandKind, bool) {
        match self {
            CommandKind::Move => (CommandKind::Line, relative),
            CommandKind::Close => (CommandKind::Move, false),
            kind => (kind, relative),
        }
    }

    /// Curve kinds whose second-to-last control point feeds a following smooth command.
    pub fn is_curve(self) -> bool {
        matches!(
            self,
            CommandKind::Cubic
                | CommandKind::SmoothCubic
                | CommandKind::Quadratic
                | CommandKind::SmoothQuadratic
        )
    }
}

// ============================================================================
// Segment geometry
// ============================================================================

/// Parameters of an elliptical arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSegment {
    pub rx: f64,
    pub ry: f64,
    /// Rotation of the ellipse x axis, in degrees.
    pub x_axis_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub to: Vector,
}

impl ArcSegment {
    /// Cubic approximation of the arc drawn from `start`.
    pub fn to_curves(&self, start: Vector) -> Vec<CubicCurve> {
        arc_to_path(start, self)
            .windows(2)
            .map(|pair| CubicCurve {
                ctrl1: pair[0].outgoing,
                ctrl2: pair[1].incoming,
                to: pair[1].point,
            })
            .collect()
    }

    /// The same arc after an affine map.
    ///
    /// The image of an ellipse is an ellipse: its radii and axis angle come
    /// from the eigen decomposition of the transformed quadratic form. When the
    /// arc or the map is degenerate only the end point moves.
    pub fn transformed(&self, t: &Transform) -> ArcSegment {
        let to = t.apply_to_point(self.to);
        let end_only = ArcSegment { to, ..*self };

        let m = if self.x_axis_rotation != 0.0 {
            *t * Transform::rotate(self.x_axis_rotation)
        } else {
            *t
        };
        // column-major 2x2 part, renamed to row-major
        let (a, c, b, d) = (m.a, m.b, m.c, m.d);
        let det = a * d - b * c;
        let det2 = det * det;
        if self.rx == 0.0 || self.ry == 0.0 || det2 == 0.0 {
            debug!(rx = self.rx, ry = self.ry, det, "degenerate arc transform");
            return end_only;
        }

        let (rx2, ry2) = (self.rx * self.rx, self.ry * self.ry);
        let qa = (d * d / rx2 + c * c / ry2) / det2;
        let qb = -(d * b / rx2 + c * a / ry2) / det2;
        let qd = (b * b / rx2 + a * a / ry2) / det2;

        let theta = (-2.0 * qb).atan2(qd - qa) / 2.0;
        let da = qd - qa;
        let l2 = 4.0 * qb * qb + da * da;
        let delta = if l2 == 0.0 {
            0.0
        } else {
            0.5 * (-da * da - 4.0 * qb * qb) / l2.sqrt()
        };
        let half = (qa + qd) / 2.0;
        if half + delta <= 0.0 || half - delta <= 0.0 {
            debug!(half, delta, "arc transform lost its ellipse");
            return end_only;
        }

        ArcSegment {
            rx: 1.0 / (half + delta).sqrt(),
            ry: 1.0 / (half - delta).sqrt(),
            x_axis_rotation: theta.to_degrees(),
            large_arc: self.large_arc,
            sweep: if det > 0.0 { self.sweep } else { !self.sweep },
            to,
        }
    }
}

/// A full cubic bezier segment; its start is the previous end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicCurve {
    pub ctrl1: Vector,
    pub ctrl2: Vector,
    pub to: Vector,
}

impl CubicCurve {
    /// Straight line from `from` to `to` as a cubic.
    pub fn line(from: Vector, to: Vector) -> Self {
        Self {
            ctrl1: from,
            ctrl2: to,
            to,
        }
    }

    /// Degree elevation of the quadratic `from`, `ctrl`, `to`.
    pub fn from_quadratic(from: Vector, ctrl: Vector, to: Vector) -> Self {
        Self {
            ctrl1: from / 3.0 + ctrl * (2.0 / 3.0),
            ctrl2: ctrl * (2.0 / 3.0) + to / 3.0,
            to,
        }
    }

    /// Grow `bbox` over this curve started at `from`, interior extrema included.
    pub fn update_bounding_box(&self, from: Vector, bbox: &mut BoundingBox) {
        let points = [from, self.ctrl1, self.ctrl2, self.to];
        if !points.iter().all(|p| bbox.x.contains(p.x)) {
            let (lo, hi) = cubic_extrema(from.x, self.ctrl1.x, self.ctrl2.x, self.to.x);
            bbox.x |= BoundingInterval::new(lo, hi);
        }
        if !points.iter().all(|p| bbox.y.contains(p.y)) {
            let (lo, hi) = cubic_extrema(from.y, self.ctrl1.y, self.ctrl2.y, self.to.y);
            bbox.y |= BoundingInterval::new(lo, hi);
        }
    }
}

impl From<CubicCurve> for Segment {
    fn from(curve: CubicCurve) -> Self {
        Segment::Cubic {
            ctrl1: curve.ctrl1,
            ctrl2: curve.ctrl2,
            to: curve.to,
        }
    }
}

fn quadratic_bounding_box(from: Vector, ctrl: Vector, to: Vector, bbox: &mut BoundingBox) {
    let points = [from, ctrl, to];
    if !points.iter().all(|p| bbox.x.contains(p.x)) {
        let (lo, hi) = quadratic_extrema(from.x, ctrl.x, to.x);
        bbox.x |= BoundingInterval::new(lo, hi);
    }
    if !points.iter().all(|p| bbox.y.contains(p.y)) {
        let (lo, hi) = quadratic_extrema(from.y, ctrl.y, to.y);
        bbox.y |= BoundingInterval::new(lo, hi);
    }
}

pub(super) fn reflect(control: Vector, through: Vector) -> Vector {
    2.0 * through - control
}

/// The numbers of one drawing instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Move { to: Vector },
    Line { to: Vector },
    Horizontal { x: f64 },
    Vertical { y: f64 },
    Cubic { ctrl1: Vector, ctrl2: Vector, to: Vector },
    SmoothCubic { ctrl2: Vector, to: Vector },
    Quadratic { ctrl: Vector, to: Vector },
    SmoothQuadratic { to: Vector },
    Arc(ArcSegment),
    Close,
}

impl Segment {
    pub fn kind(&self) -> CommandKind {
        match self {
            Segment::Move { .. } => CommandKind::Move,
            Segment::Line { .. } => CommandKind::Line,
            Segment::Horizontal { .. } => CommandKind::Horizontal,
            Segment::Vertical { .. } => CommandKind::Vertical,
            Segment::Cubic { .. } => CommandKind::Cubic,
            Segment::SmoothCubic { .. } => CommandKind::SmoothCubic,
            Segment::Quadratic { .. } => CommandKind::Quadratic,
            Segment::SmoothQuadratic { .. } => CommandKind::SmoothQuadratic,
            Segment::Arc(_) => CommandKind::Arc,
            Segment::Close => CommandKind::Close,
        }
    }

    /// Build a segment from exactly `kind.arity()` numbers.
    pub fn from_args(kind: CommandKind, args: &[f64]) -> Option<Segment> {
        let segment = match (kind, args) {
            (CommandKind::Move, &[x, y]) => Segment::Move { to: dvec2(x, y) },
            (CommandKind::Line, &[x, y]) => Segment::Line { to: dvec2(x, y) },
            (CommandKind::Horizontal, &[x]) => Segment::Horizontal { x },
            (CommandKind::Vertical, &[y]) => Segment::Vertical { y },
            (CommandKind::Cubic, &[x1, y1, x2, y2, x, y]) => Segment::Cubic {
                ctrl1: dvec2(x1, y1),
                ctrl2: dvec2(x2, y2),
                to: dvec2(x, y),
            },
            (CommandKind::SmoothCubic, &[x2, y2, x, y]) => Segment::SmoothCubic {
                ctrl2: dvec2(x2, y2),
                to: dvec2(x, y),
            },
            (CommandKind::Quadratic, &[x1, y1, x, y]) => Segment::Quadratic {
                ctrl: dvec2(x1, y1),
                to: dvec2(x, y),
            },
            (CommandKind::SmoothQuadratic, &[x, y]) => Segment::SmoothQuadratic { to: dvec2(x, y) },
            (CommandKind::Arc, &[rx, ry, rotation, large_arc, sweep, x, y]) => {
                Segment::Arc(ArcSegment {
                    rx,
                    ry,
                    x_axis_rotation: rotation,
                    large_arc: large_arc != 0.0,
                    sweep: sweep != 0.0,
                    to: dvec2(x, y),
                })
            }
            (CommandKind::Close, &[]) => Segment::Close,
            _ => return None,
        };
        Some(segment)
    }

    /// The numbers in path data order; arc flags are 0 or 1.
    pub fn args(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        match *self {
            Segment::Move { to } | Segment::Line { to } | Segment::SmoothQuadratic { to } => {
                vec![to.x, to.y]
            }
            Segment::Horizontal { x } => vec![x],
            Segment::Vertical { y } => vec![y],
            Segment::Cubic { ctrl1, ctrl2, to } => {
                vec![ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y]
            }
            Segment::SmoothCubic { ctrl2: ctrl, to } | Segment::Quadratic { ctrl, to } => {
                vec![ctrl.x, ctrl.y, to.x, to.y]
            }
            Segment::Arc(arc) => vec![
                arc.rx,
                arc.ry,
                arc.x_axis_rotation,
                flag(arc.large_arc),
                flag(arc.sweep),
                arc.to.x,
                arc.to.y,
            ],
            Segment::Close => Vec::new(),
        }
    }

    /// Shift every coordinate by `delta`. Arc radii, angle and flags are not coordinates.
    pub fn offset(&self, delta: Vector) -> Segment {
        match *self {
            Segment::Move { to } => Segment::Move { to: to + delta },
            Segment::Line { to } => Segment::Line { to: to + delta },
            Segment::Horizontal { x } => Segment::Horizontal { x: x + delta.x },
            Segment::Vertical { y } => Segment::Vertical { y: y + delta.y },
            Segment::Cubic { ctrl1, ctrl2, to } => Segment::Cubic {
                ctrl1: ctrl1 + delta,
                ctrl2: ctrl2 + delta,
                to: to + delta,
            },
            Segment::SmoothCubic { ctrl2, to } => Segment::SmoothCubic {
                ctrl2: ctrl2 + delta,
                to: to + delta,
            },
            Segment::Quadratic { ctrl, to } => Segment::Quadratic {
                ctrl: ctrl + delta,
                to: to + delta,
            },
            Segment::SmoothQuadratic { to } => Segment::SmoothQuadratic { to: to + delta },
            Segment::Arc(arc) => Segment::Arc(ArcSegment {
                to: arc.to + delta,
                ..arc
            }),
            Segment::Close => Segment::Close,
        }
    }

    // The methods below read the numbers as absolute coordinates.

    fn end_point(&self, first: Vector, previous: Vector) -> Vector {
        match *self {
            Segment::Move { to }
            | Segment::Line { to }
            | Segment::Cubic { to, .. }
            | Segment::SmoothCubic { to, .. }
            | Segment::Quadratic { to, .. }
            | Segment::SmoothQuadratic { to } => to,
            Segment::Arc(arc) => arc.to,
            Segment::Horizontal { x } => dvec2(x, previous.y),
            Segment::Vertical { y } => dvec2(previous.x, y),
            Segment::Close => first,
        }
    }

    fn to_line(&self, previous: Vector) -> Segment {
        match *self {
            Segment::Horizontal { x } => Segment::Line {
                to: dvec2(x, previous.y),
            },
            Segment::Vertical { y } => Segment::Line {
                to: dvec2(previous.x, y),
            },
            other => other,
        }
    }

    fn transformed(&self, t: &Transform, previous: Vector) -> Segment {
        let map = |p: Vector| t.apply_to_point(p);
        match *self {
            Segment::Move { to } => Segment::Move { to: map(to) },
            Segment::Line { to } => Segment::Line { to: map(to) },
            Segment::Horizontal { .. } | Segment::Vertical { .. } => {
                self.to_line(previous).transformed(t, previous)
            }
            Segment::Cubic { ctrl1, ctrl2, to } => Segment::Cubic {
                ctrl1: map(ctrl1),
                ctrl2: map(ctrl2),
                to: map(to),
            },
            Segment::SmoothCubic { ctrl2, to } => Segment::SmoothCubic {
                ctrl2: map(ctrl2),
                to: map(to),
            },
            Segment::Quadratic { ctrl, to } => Segment::Quadratic {
                ctrl: map(ctrl),
                to: map(to),
            },
            Segment::SmoothQuadratic { to } => Segment::SmoothQuadratic { to: map(to) },
            Segment::Arc(arc) => Segment::Arc(arc.transformed(t)),
            Segment::Close => Segment::Close,
        }
    }
}

// ============================================================================
// PathCommand
// ============================================================================

/// One instruction of a path, with the coordinate mode it was written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Absolute(Segment),
    Relative(Segment),
}

impl PathCommand {
    /// Build a command from its kind, mode and exactly `kind.arity()` numbers.
    pub fn new(kind: CommandKind, relative: bool, args: &[f64]) -> Option<PathCommand> {
        let segment = Segment::from_args(kind, args)?;
        Some(if relative {
            PathCommand::Relative(segment)
        } else {
            PathCommand::Absolute(segment)
        })
    }

    pub fn segment(&self) -> &Segment {
        match self {
            PathCommand::Absolute(s) | PathCommand::Relative(s) => s,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.segment().kind()
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, PathCommand::Relative(_))
    }

    pub fn is_absolute(&self) -> bool {
        !self.is_relative()
    }

    pub fn letter(&self) -> char {
        self.kind().letter(self.is_relative())
    }

    pub fn args(&self) -> Vec<f64> {
        self.segment().args()
    }

    /// The segment in absolute coordinates.
    pub fn absolute_segment(&self, previous: Vector) -> Segment {
        match self {
            PathCommand::Absolute(s) => *s,
            PathCommand::Relative(s) => s.offset(previous),
        }
    }

    pub fn to_absolute(&self, previous: Vector) -> PathCommand {
        PathCommand::Absolute(self.absolute_segment(previous))
    }

    pub fn to_relative(&self, previous: Vector) -> PathCommand {
        match self {
            PathCommand::Absolute(s) => PathCommand::Relative(s.offset(-previous)),
            PathCommand::Relative(_) => *self,
        }
    }

    /// Where the pen rests after this command. A close returns to the subpath start.
    pub fn end_point(&self, pen: &PenState) -> Vector {
        self.absolute_segment(pen.previous)
            .end_point(pen.first, pen.previous)
    }

    /// Absolute control and end points, with smooth commands' implied control
    /// point made explicit.
    pub fn control_points(&self, pen: &PenState) -> Vec<Vector> {
        let previous = pen.previous;
        match self.absolute_segment(previous) {
            Segment::Move { to } | Segment::Line { to } => vec![to],
            Segment::Horizontal { x } => vec![dvec2(x, previous.y)],
            Segment::Vertical { y } => vec![dvec2(previous.x, y)],
            Segment::Cubic { ctrl1, ctrl2, to } => vec![ctrl1, ctrl2, to],
            Segment::SmoothCubic { ctrl2, to } => {
                vec![reflect(pen.previous_control, previous), ctrl2, to]
            }
            Segment::Quadratic { ctrl, to } => vec![ctrl, to],
            Segment::SmoothQuadratic { to } => vec![reflect(pen.previous_control, previous), to],
            Segment::Arc(arc) => vec![arc.to],
            Segment::Close => vec![pen.first],
        }
    }

    /// Absolute command with no implied geometry: lines for `H`/`V`, explicit
    /// first control points for `S`/`T`.
    pub fn to_non_shorthand(&self, pen: &PenState) -> PathCommand {
        let previous = pen.previous;
        let segment = match self.absolute_segment(previous) {
            s @ (Segment::Horizontal { .. } | Segment::Vertical { .. }) => s.to_line(previous),
            Segment::SmoothCubic { ctrl2, to } => Segment::Cubic {
                ctrl1: reflect(pen.previous_control, previous),
                ctrl2,
                to,
            },
            Segment::SmoothQuadratic { to } => Segment::Quadratic {
                ctrl: reflect(pen.previous_control, previous),
                to,
            },
            other => other,
        };
        PathCommand::Absolute(segment)
    }

    /// `H`/`V` rewritten as a line in the same coordinate mode.
    pub fn to_line(&self, previous: Vector) -> PathCommand {
        match self {
            PathCommand::Absolute(s) => PathCommand::Absolute(s.to_line(previous)),
            PathCommand::Relative(s) => PathCommand::Relative(s.to_line(Vector::ZERO)),
        }
    }

    /// The command as one absolute cubic.
    pub fn to_curve(&self, pen: &PenState) -> Result<CubicCurve, GeometryError> {
        let previous = pen.previous;
        match self.to_non_shorthand(pen).segment() {
            Segment::Line { to } => Ok(CubicCurve::line(previous, *to)),
            Segment::Cubic { ctrl1, ctrl2, to } => Ok(CubicCurve {
                ctrl1: *ctrl1,
                ctrl2: *ctrl2,
                to: *to,
            }),
            Segment::Quadratic { ctrl, to } => Ok(CubicCurve::from_quadratic(previous, *ctrl, *to)),
            _ => Err(GeometryError::NotACurve {
                letter: self.letter(),
            }),
        }
    }

    /// The command as absolute cubics. Arcs give one cubic per sector.
    pub fn to_curves(&self, pen: &PenState) -> Result<Vec<CubicCurve>, GeometryError> {
        match self.absolute_segment(pen.previous) {
            Segment::Arc(arc) => Ok(arc.to_curves(pen.previous)),
            _ => self.to_curve(pen).map(|curve| vec![curve]),
        }
    }

    /// Grow `bbox` to cover this command drawn from `pen`.
    pub fn update_bounding_box(&self, pen: &PenState, bbox: &mut BoundingBox) {
        let previous = pen.previous;
        match self.absolute_segment(previous) {
            Segment::Move { to } => bbox.expand_point(to),
            s @ (Segment::Line { .. } | Segment::Horizontal { .. } | Segment::Vertical { .. }) => {
                bbox.expand_point(previous);
                bbox.expand_point(s.end_point(pen.first, previous));
            }
            Segment::Cubic { ctrl1, ctrl2, to } => {
                CubicCurve { ctrl1, ctrl2, to }.update_bounding_box(previous, bbox)
            }
            Segment::Quadratic { ctrl, to } => quadratic_bounding_box(previous, ctrl, to, bbox),
            Segment::SmoothCubic { .. } | Segment::SmoothQuadratic { .. } => {
                self.to_non_shorthand(pen).update_bounding_box(pen, bbox)
            }
            Segment::Arc(arc) => {
                let mut from = previous;
                for curve in arc.to_curves(previous) {
                    curve.update_bounding_box(from, bbox);
                    from = curve.to;
                }
            }
            Segment::Close => {}
        }
    }

    /// Apply `t` to this command.
    ///
    /// `previous` is the pen position before the command in the original path
    /// and `previous_new` the position in the transformed one. Relative
    /// commands stay relative, about the transformed position. `H`/`V` become
    /// lines since an axis aligned step rarely stays axis aligned.
    pub fn transform(&self, t: &Transform, previous: Vector, previous_new: Vector) -> PathCommand {
        match self.to_line(previous) {
            PathCommand::Absolute(s) => PathCommand::Absolute(s.transformed(t, previous)),
            relative @ PathCommand::Relative(_) => {
                let absolute = relative.absolute_segment(previous).transformed(t, previous);
                PathCommand::Absolute(absolute).to_relative(previous_new)
            }
        }
    }

    /// Letter and arguments, space separated.
    pub fn to_string_with(&self, opts: &FormatOptions) -> String {
        let mut out = String::new();
        out.push(self.letter());
        for value in self.args() {
            out.push(' ');
            out.push_str(&opts.num(value));
        }
        out
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&FormatOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VectorExt;

    fn pen(first: Vector, previous: Vector, previous_control: Vector) -> PenState {
        PenState {
            first,
            previous,
            previous_control,
        }
    }

    fn cmd(letter: char, args: &[f64]) -> PathCommand {
        let (kind, relative) = CommandKind::from_letter(letter).unwrap();
        PathCommand::new(kind, relative, args).unwrap()
    }

    // ==================== CommandKind tests ====================

    #[test]
    fn letters_round_trip() {
        for letter in "MmLlHhVvCcSsQqTtAaZz".chars() {
            let (kind, relative) = CommandKind::from_letter(letter).unwrap();
            assert_eq!(kind.letter(relative), letter);
        }
        assert_eq!(CommandKind::from_letter('X'), None);
    }

    #[test]
    fn arity_table() {
        let arities: Vec<usize> = "MLHVCSQTAZ"
            .chars()
            .map(|c| CommandKind::from_letter(c).unwrap().0.arity())
            .collect();
        assert_eq!(arities, vec![2, 2, 1, 1, 6, 4, 4, 2, 7, 0]);
    }

    #[test]
    fn implicit_successors() {
        assert_eq!(CommandKind::Move.next(true), (CommandKind::Line, true));
        assert_eq!(CommandKind::Close.next(true), (CommandKind::Move, false));
        assert_eq!(CommandKind::Cubic.next(false), (CommandKind::Cubic, false));
    }

    #[test]
    fn from_args_checks_arity() {
        assert!(Segment::from_args(CommandKind::Line, &[1.0]).is_none());
        assert!(Segment::from_args(CommandKind::Close, &[1.0]).is_none());
        let arc = Segment::from_args(CommandKind::Arc, &[5.0, 5.0, 0.0, 1.0, 0.0, 10.0, 0.0]);
        match arc {
            Some(Segment::Arc(a)) => {
                assert!(a.large_arc);
                assert!(!a.sweep);
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    // ==================== Conversion tests ====================

    #[test]
    fn relative_to_absolute_and_back() {
        let prev = dvec2(10.0, 20.0);
        let rel = cmd('c', &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let abs = rel.to_absolute(prev);
        assert_eq!(abs, cmd('C', &[11.0, 22.0, 13.0, 24.0, 15.0, 26.0]));
        assert_eq!(abs.to_relative(prev), rel);
    }

    #[test]
    fn relative_horizontal_and_arc_offsets() {
        let prev = dvec2(10.0, 20.0);
        assert_eq!(cmd('h', &[5.0]).to_absolute(prev), cmd('H', &[15.0]));
        assert_eq!(cmd('v', &[5.0]).to_absolute(prev), cmd('V', &[25.0]));
        let arc = cmd('a', &[3.0, 4.0, 30.0, 0.0, 1.0, 1.0, 1.0]).to_absolute(prev);
        assert_eq!(arc, cmd('A', &[3.0, 4.0, 30.0, 0.0, 1.0, 11.0, 21.0]));
    }

    #[test]
    fn end_points() {
        let p = pen(dvec2(1.0, 1.0), dvec2(5.0, 7.0), dvec2(5.0, 7.0));
        assert_eq!(cmd('H', &[9.0]).end_point(&p), dvec2(9.0, 7.0));
        assert_eq!(cmd('v', &[-2.0]).end_point(&p), dvec2(5.0, 5.0));
        assert_eq!(cmd('Z', &[]).end_point(&p), dvec2(1.0, 1.0));
        assert_eq!(cmd('l', &[1.0, 1.0]).end_point(&p), dvec2(6.0, 8.0));
    }

    #[test]
    fn smooth_reflects_previous_control() {
        let p = pen(Vector::ZERO, dvec2(10.0, 10.0), dvec2(8.0, 6.0));
        let s = cmd('S', &[20.0, 20.0, 30.0, 10.0]);
        assert_eq!(
            s.control_points(&p),
            vec![dvec2(12.0, 14.0), dvec2(20.0, 20.0), dvec2(30.0, 10.0)]
        );
        assert_eq!(
            s.to_non_shorthand(&p),
            cmd('C', &[12.0, 14.0, 20.0, 20.0, 30.0, 10.0])
        );
        assert_eq!(
            cmd('t', &[5.0, 0.0]).to_non_shorthand(&p),
            cmd('Q', &[12.0, 14.0, 15.0, 10.0])
        );
    }

    #[test]
    fn horizontal_becomes_line() {
        let p = pen(Vector::ZERO, dvec2(3.0, 4.0), dvec2(3.0, 4.0));
        assert_eq!(cmd('H', &[10.0]).to_non_shorthand(&p), cmd('L', &[10.0, 4.0]));
        assert_eq!(cmd('v', &[2.0]).to_non_shorthand(&p), cmd('L', &[3.0, 6.0]));
        assert_eq!(cmd('h', &[2.0]).to_line(p.previous), cmd('l', &[2.0, 0.0]));
    }

    #[test]
    fn to_curve_variants() {
        let p = pen(Vector::ZERO, dvec2(0.0, 0.0), dvec2(0.0, 0.0));
        let line = cmd('L', &[3.0, 3.0]).to_curve(&p).unwrap();
        assert_eq!(line, CubicCurve::line(dvec2(0.0, 0.0), dvec2(3.0, 3.0)));

        let quad = cmd('Q', &[3.0, 6.0, 6.0, 0.0]).to_curve(&p).unwrap();
        assert!(quad.ctrl1.is_close(dvec2(2.0, 4.0)));
        assert!(quad.ctrl2.is_close(dvec2(4.0, 4.0)));
        assert_eq!(quad.to, dvec2(6.0, 0.0));
    }

    #[test]
    fn move_and_close_are_not_curves() {
        let p = PenState::default();
        assert_eq!(
            cmd('m', &[1.0, 1.0]).to_curve(&p),
            Err(GeometryError::NotACurve { letter: 'm' })
        );
        assert_eq!(
            cmd('Z', &[]).to_curve(&p),
            Err(GeometryError::NotACurve { letter: 'Z' })
        );
    }

    // ==================== Bounding box tests ====================

    #[test]
    fn cubic_bbox_includes_interior_extremum() {
        let p = pen(Vector::ZERO, dvec2(0.0, 0.0), dvec2(0.0, 0.0));
        let mut bbox = BoundingBox::from_point(p.previous);
        cmd('C', &[0.0, 10.0, 10.0, 10.0, 10.0, 0.0]).update_bounding_box(&p, &mut bbox);
        assert_eq!(bbox.x, BoundingInterval::new(0.0, 10.0));
        assert!((bbox.y.maximum - 7.5).abs() < 1e-12);
    }

    #[test]
    fn horizontal_bbox_spans_from_previous() {
        let p = pen(Vector::ZERO, dvec2(2.0, 3.0), dvec2(2.0, 3.0));
        let mut bbox = BoundingBox::from_point(p.previous);
        cmd('h', &[-5.0]).update_bounding_box(&p, &mut bbox);
        assert_eq!(bbox, BoundingBox::from_corners(dvec2(-3.0, 3.0), dvec2(2.0, 3.0)));
    }

    #[test]
    fn arc_bbox_covers_bulge() {
        let p = pen(Vector::ZERO, dvec2(0.0, 0.0), dvec2(0.0, 0.0));
        let mut bbox = BoundingBox::from_point(p.previous);
        cmd('A', &[5.0, 5.0, 0.0, 0.0, 1.0, 10.0, 0.0]).update_bounding_box(&p, &mut bbox);
        assert!((bbox.x.maximum - 10.0).abs() < 1e-9);
        // half circle of radius 5 bulging to y = -5 or y = 5
        assert!((bbox.height() - 5.0).abs() < 1e-3, "{bbox:?}");
    }

    // ==================== Transform tests ====================

    #[test]
    fn relative_command_stays_relative_under_transform() {
        let t = Transform::scale(2.0);
        let moved = cmd('l', &[1.0, 1.0]).transform(&t, dvec2(5.0, 5.0), dvec2(10.0, 10.0));
        assert_eq!(moved, cmd('l', &[2.0, 2.0]));
    }

    #[test]
    fn horizontal_under_rotation_is_a_line() {
        let t = Transform::rotate(90.0);
        let out = cmd('H', &[10.0]).transform(&t, dvec2(0.0, 0.0), dvec2(0.0, 0.0));
        match out {
            PathCommand::Absolute(Segment::Line { to }) => assert!(to.is_close(dvec2(0.0, 10.0))),
            other => panic!("expected absolute line, got {other:?}"),
        }
    }

    #[test]
    fn arc_under_uniform_scale() {
        let arc = ArcSegment {
            rx: 5.0,
            ry: 3.0,
            x_axis_rotation: 0.0,
            large_arc: false,
            sweep: true,
            to: dvec2(10.0, 0.0),
        };
        let out = arc.transformed(&Transform::scale(2.0));
        assert!((out.rx - 10.0).abs() < 1e-9);
        assert!((out.ry - 6.0).abs() < 1e-9);
        assert!(out.x_axis_rotation.abs() < 1e-9);
        assert!(out.sweep);
        assert_eq!(out.to, dvec2(20.0, 0.0));
    }

    #[test]
    fn arc_under_mirror_flips_sweep() {
        let arc = ArcSegment {
            rx: 5.0,
            ry: 5.0,
            x_axis_rotation: 0.0,
            large_arc: true,
            sweep: true,
            to: dvec2(10.0, 0.0),
        };
        let out = arc.transformed(&Transform::scale_xy(1.0, -1.0));
        assert!(!out.sweep);
        assert!(out.large_arc);
        assert!((out.rx - 5.0).abs() < 1e-9);
    }

    #[test]
    fn arc_under_singular_transform_moves_end_only() {
        let arc = ArcSegment {
            rx: 5.0,
            ry: 5.0,
            x_axis_rotation: 15.0,
            large_arc: false,
            sweep: false,
            to: dvec2(10.0, 4.0),
        };
        let out = arc.transformed(&Transform::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        assert_eq!(out.rx, 5.0);
        assert_eq!(out.x_axis_rotation, 15.0);
        assert_eq!(out.to, dvec2(10.0, 0.0));
    }

    // ==================== Display tests ====================

    #[test]
    fn display_letter_and_args() {
        insta::assert_snapshot!(cmd('M', &[10.0, 20.5]).to_string(), @"M 10 20.5");
        insta::assert_snapshot!(cmd('z', &[]).to_string(), @"z");
        insta::assert_snapshot!(
            cmd('a', &[5.0, 5.0, 0.0, 0.0, 1.0, 10.0, 0.0]).to_string(),
            @"a 5 5 0 0 1 10 0"
        );
    }
}
