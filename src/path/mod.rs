//! Paths: ordered sequences of drawing commands.
//!
//! Most path operations are a single forward scan. The scan state is a
//! [`PenState`]: where the current subpath started, where the last command
//! ended, and the control point a following smooth curve reflects.
//! [`Path::walk`] pairs every command with the state it is drawn from.

mod arc;
mod command;
mod superpath;

use std::fmt;
use std::str::FromStr;

pub use arc::arc_to_path;
pub use command::{ArcSegment, CommandKind, CubicCurve, PathCommand, Segment};
pub use superpath::{CubicNode, CubicSuperPath, SubPath};

use crate::bounds::BoundingBox;
use crate::errors::ParseError;
use crate::format::FormatOptions;
use crate::transform::Transform;
use crate::types::Vector;

/// Pen position carried from one command to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PenState {
    /// Start of the current subpath, where a close returns to.
    pub first: Vector,
    /// End point of the previous command.
    pub previous: Vector,
    /// Second-to-last control point of the previous curve, or the previous
    /// end point when the previous command was not a curve.
    pub previous_control: Vector,
}

impl PenState {
    /// State after drawing `command` from this one.
    pub fn advance(&self, command: &PathCommand) -> PenState {
        let end = command.end_point(self);
        let previous_control = if command.kind().is_curve() {
            let points = command.control_points(self);
            points
                .len()
                .checked_sub(2)
                .and_then(|i| points.get(i).copied())
                .unwrap_or(end)
        } else {
            end
        };
        PenState {
            first: if command.kind() == CommandKind::Move {
                end
            } else {
                self.first
            },
            previous: end,
            previous_control,
        }
    }
}

/// Iterator returned by [`Path::walk`].
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    commands: std::slice::Iter<'a, PathCommand>,
    pen: PenState,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (PenState, &'a PathCommand);

    fn next(&mut self) -> Option<Self::Item> {
        let command = self.commands.next()?;
        let pen = self.pen;
        self.pen = pen.advance(command);
        Some((pen, command))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.commands.size_hint()
    }
}

/// An SVG path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_commands(commands: Vec<PathCommand>) -> Self {
        Self { commands }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: PathCommand) {
        self.commands.push(command);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathCommand> {
        self.commands.iter()
    }

    /// Every command with the pen state it starts from. The pen starts at the origin.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            commands: self.commands.iter(),
            pen: PenState::default(),
        }
    }

    /// Close the last subpath unless the path already ends with a close.
    pub fn close(&mut self) {
        match self.commands.last() {
            Some(last) if last.kind() != CommandKind::Close => {
                self.commands.push(PathCommand::Absolute(Segment::Close));
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Normal forms
    // ------------------------------------------------------------------------

    pub fn to_absolute(&self) -> Path {
        self.walk()
            .map(|(pen, command)| command.to_absolute(pen.previous))
            .collect()
    }

    pub fn to_relative(&self) -> Path {
        self.walk()
            .map(|(pen, command)| command.to_relative(pen.previous))
            .collect()
    }

    /// Absolute path without `H`, `V`, `S` or `T`.
    pub fn to_non_shorthand(&self) -> Path {
        self.walk()
            .map(|(pen, command)| command.to_non_shorthand(&pen))
            .collect()
    }

    pub fn to_superpath(&self) -> CubicSuperPath {
        CubicSuperPath::from_path(self)
    }

    // ------------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------------

    /// Tight bounds of everything the path draws, `None` for an empty path.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut walk = self.walk();
        let (pen, first) = walk.next()?;
        let mut bbox = BoundingBox::from_point(first.end_point(&pen));
        for (pen, command) in walk {
            command.update_bounding_box(&pen, &mut bbox);
        }
        Some(bbox)
    }

    /// Absolute control and end points of every command, in order.
    pub fn control_points(&self) -> Vec<Vector> {
        self.walk()
            .flat_map(|(pen, command)| command.control_points(&pen))
            .collect()
    }

    /// Absolute end point of every command.
    pub fn end_points(&self) -> Vec<Vector> {
        self.walk()
            .map(|(pen, command)| command.end_point(&pen))
            .collect()
    }

    /// Apply `t` to every coordinate.
    ///
    /// Relative commands stay relative and `H`/`V` become lines (see
    /// [`PathCommand::transform`]).
    pub fn transform(&self, t: &Transform) -> Path {
        let mut pen_new = PenState::default();
        self.walk()
            .map(|(pen, command)| {
                let out = command.transform(t, pen.previous, pen_new.previous);
                pen_new = pen_new.advance(&out);
                out
            })
            .collect()
    }

    pub fn transform_in_place(&mut self, t: &Transform) {
        *self = self.transform(t);
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Path {
        self.transform(&Transform::translate(dx, dy))
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Path {
        self.transform(&Transform::scale_xy(sx, sy))
    }

    /// Rotate by `degrees` about `center`, or about the centre of the bounding box.
    pub fn rotate(&self, degrees: f64, center: Option<Vector>) -> Path {
        let center = center
            .or_else(|| self.bounding_box().map(|bbox| bbox.center()))
            .unwrap_or(Vector::ZERO);
        self.transform(&Transform::rotate_about(degrees, center))
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    pub fn to_string_with(&self, opts: &FormatOptions) -> String {
        self.commands
            .iter()
            .map(|command| command.to_string_with(opts))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&FormatOptions::default()))
    }
}

impl FromStr for Path {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_path(s)
    }
}

impl FromIterator<PathCommand> for Path {
    fn from_iter<I: IntoIterator<Item = PathCommand>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}

impl Extend<PathCommand> for Path {
    fn extend<I: IntoIterator<Item = PathCommand>>(&mut self, iter: I) {
        self.commands.extend(iter);
    }
}

impl IntoIterator for Path {
    type Item = PathCommand;
    type IntoIter = std::vec::IntoIter<PathCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathCommand;
    type IntoIter = std::slice::Iter<'a, PathCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
