//! SVG path geometry for TikZ conversion.
//!
//! Parses SVG path data and transform lists, and provides what a converter
//! needs on top of them: absolute/relative rewriting, affine transforms that
//! keep every command kind intact, tight bounding boxes, arc flattening to
//! cubic beziers, bezier measurements, and TikZ path emission.
//!
//! ```
//! let path: tikzpath::Path = "M 0 0 L 10 0 L 10 10 Z".parse().unwrap();
//! let bbox = path.bounding_box().unwrap();
//! assert_eq!(bbox.width(), 10.0);
//! ```

use pest_derive::Parser;

pub mod bezier;
pub mod bounds;
pub mod errors;
pub mod format;
mod log;
pub mod parse;
pub mod path;
pub mod tikz;
pub mod transform;
pub mod types;

pub use bounds::{BoundingBox, BoundingInterval};
pub use errors::{GeometryError, ParseError, SourceContext};
pub use format::FormatOptions;
pub use parse::{parse_path, parse_path_named, parse_transform};
pub use path::{
    ArcSegment, CommandKind, CubicCurve, CubicNode, CubicSuperPath, Path, PathCommand, PenState,
    Segment, SubPath, arc_to_path,
};
pub use tikz::{TikzOptions, path_to_tikz};
pub use transform::{Transform, TransformKind};
pub use types::{DirectedLineSegment, Vector, VectorExt};

#[derive(Parser)]
#[grammar = "svg.pest"]
pub struct SvgParser;

/// Parse many path attributes, one result per input.
///
/// A bad path never stops the batch; its error is returned in its slot and
/// logged.
pub fn parse_paths<'a, I>(sources: I) -> Vec<Result<Path, ParseError>>
where
    I: IntoIterator<Item = &'a str>,
{
    sources
        .into_iter()
        .enumerate()
        .map(|(index, source)| {
            let result = parse_path_named(&format!("path #{index}"), source);
            if let Err(err) = &result {
                log::warn!(index, %err, "skipping unparseable path");
            }
            result
        })
        .collect()
}
