//! Error types with rich diagnostics using miette
//!
//! Parse errors carry the offending path or transform text together with a
//! source span so that a batch conversion can report exactly which token of
//! which attribute was rejected. Geometry errors flag operations that are
//! mathematically undefined for the given input.

use miette::{Diagnostic, NamedSource, SourceSpan};
use pest::error::InputLocation;
use thiserror::Error;

use crate::Rule;

/// The attribute text being parsed, kept so diagnostics can point into it.
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// `d`, `transform`, an element id, or a batch label such as `path #3`.
    pub name: String,
    pub source: String,
}

impl SourceContext {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Labelled copy of the attribute for a miette report.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Errors that occur while parsing path data or transform lists.
///
/// A failed parse never yields a partial result: the whole path (or the whole
/// transform list) is rejected.
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("invalid {what}: {message}")]
    #[diagnostic(code(tikzpath::parse::syntax))]
    Syntax {
        what: &'static str,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected input")]
        span: SourceSpan,
    },

    #[error("invalid number: {text}")]
    #[diagnostic(code(tikzpath::parse::invalid_number))]
    InvalidNumber {
        text: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a number")]
        span: SourceSpan,
    },

    #[error("command `{letter}` has no arguments")]
    #[diagnostic(
        code(tikzpath::parse::missing_arguments),
        help("every command except `Z` needs at least one full group of numbers")
    )]
    MissingArguments {
        letter: char,
        arity: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("expected {arity} numbers after this")]
        span: SourceSpan,
    },

    #[error("command `{letter}` takes {arity} numbers per segment, {leftover} left over")]
    #[diagnostic(code(tikzpath::parse::argument_count))]
    ArgumentCount {
        letter: char,
        arity: usize,
        leftover: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("incomplete segment")]
        span: SourceSpan,
    },

    #[error("`{name}` does not accept {count} arguments")]
    #[diagnostic(code(tikzpath::parse::transform_arguments))]
    TransformArguments {
        name: String,
        count: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("wrong number of arguments")]
        span: SourceSpan,
        #[help]
        expected: Option<String>,
    },
}

impl ParseError {
    /// Convert a pest failure into a spanned syntax error.
    pub(crate) fn from_pest(
        err: pest::error::Error<Rule>,
        ctx: &SourceContext,
        what: &'static str,
    ) -> Self {
        let span = match err.location {
            InputLocation::Pos(pos) => SourceSpan::from((pos, 0)),
            InputLocation::Span((start, end)) => SourceSpan::from((start, end - start)),
        };
        ParseError::Syntax {
            what,
            message: err.variant.message().into_owned(),
            src: ctx.named_source(),
            span,
        }
    }
}

// ============================================================================
// Geometry Errors
// ============================================================================

/// Operations that are undefined for the geometry they were given.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("transform is not invertible (determinant {determinant})")]
    #[diagnostic(code(tikzpath::geometry::singular_matrix))]
    SingularMatrix { determinant: f64 },

    #[error("rotation angle is undefined for non-uniformly scaled or skewed matrices")]
    #[diagnostic(code(tikzpath::geometry::undefined_rotation))]
    UndefinedRotation,

    #[error("`{letter}` segments can not be changed into curves")]
    #[diagnostic(code(tikzpath::geometry::not_a_curve))]
    NotACurve { letter: char },

    #[error("area is zero, cannot calculate the centre of mass")]
    #[diagnostic(code(tikzpath::geometry::zero_area))]
    ZeroArea,
}
