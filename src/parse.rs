//! Parse pest pairs into paths and transforms

use glam::dvec2;
use miette::SourceSpan;
use pest::Parser;
use pest::iterators::Pair;

use crate::errors::{ParseError, SourceContext};
use crate::log::{debug, trace};
use crate::path::{CommandKind, Path, PathCommand};
use crate::transform::Transform;
use crate::{Rule, SvgParser};

/// Parse SVG path data.
pub fn parse_path(source: &str) -> Result<Path, ParseError> {
    parse_path_named("d", source)
}

/// Parse SVG path data, naming the source in diagnostics (an element id, a file).
pub fn parse_path_named(name: &str, source: &str) -> Result<Path, ParseError> {
    let ctx = SourceContext::new(name, source);
    let pairs = SvgParser::parse(Rule::path_data, source)
        .map_err(|e| ParseError::from_pest(e, &ctx, "path data"))?;

    let mut path = Path::new();
    for pair in pairs {
        if pair.as_rule() == Rule::path_data {
            for inner in pair.into_inner() {
                if inner.as_rule() == Rule::command {
                    parse_command(inner, &ctx, &mut path)?;
                }
            }
        }
    }
    debug!(name, commands = path.len(), "parsed path data");
    Ok(path)
}

fn span_of(pair: &Pair<'_, Rule>) -> SourceSpan {
    let span = pair.as_span();
    SourceSpan::from((span.start(), span.end() - span.start()))
}

fn parse_number(pair: &Pair<'_, Rule>, ctx: &SourceContext) -> Result<f64, ParseError> {
    let text = pair.as_str();
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::InvalidNumber {
            text: text.to_string(),
            src: ctx.named_source(),
            span: span_of(pair),
        }),
    }
}

/// One letter and its run of numbers, sliced into as many segments as the
/// letter's arity allows.
fn parse_command(
    pair: Pair<'_, Rule>,
    ctx: &SourceContext,
    path: &mut Path,
) -> Result<(), ParseError> {
    let command_span = span_of(&pair);
    let mut inner = pair.into_inner();
    let letter_pair = inner.next().ok_or_else(|| ParseError::Syntax {
        what: "path data",
        message: "expected a command letter".to_string(),
        src: ctx.named_source(),
        span: command_span,
    })?;
    let letter = letter_pair.as_str().chars().next().unwrap_or_default();
    let (mut kind, mut relative) =
        CommandKind::from_letter(letter).ok_or_else(|| ParseError::Syntax {
            what: "path data",
            message: format!("unknown command `{letter}`"),
            src: ctx.named_source(),
            span: span_of(&letter_pair),
        })?;

    let mut numbers = Vec::new();
    let mut spans = Vec::new();
    for number in inner {
        numbers.push(parse_number(&number, ctx)?);
        spans.push(number.as_span());
    }

    if numbers.is_empty() && kind.arity() > 0 {
        return Err(ParseError::MissingArguments {
            letter,
            arity: kind.arity(),
            src: ctx.named_source(),
            span: span_of(&letter_pair),
        });
    }

    let mut offset = 0;
    loop {
        let arity = kind.arity();
        let rest = &numbers[offset..];
        let group = rest.get(..arity);
        let command = group.and_then(|args| PathCommand::new(kind, relative, args));
        let Some(command) = command else {
            let start = spans.get(offset).map_or(0, |s| s.start());
            let end = spans.last().map_or(start, |s| s.end());
            return Err(ParseError::ArgumentCount {
                letter: kind.letter(relative),
                arity,
                leftover: rest.len(),
                src: ctx.named_source(),
                span: SourceSpan::from((start, end - start)),
            });
        };
        trace!(%command, "parsed command");
        path.push(command);
        offset += arity;
        if offset >= numbers.len() {
            break;
        }
        (kind, relative) = kind.next(relative);
    }
    Ok(())
}

/// Parse an SVG transform list. Functions compose left to right.
pub fn parse_transform(source: &str) -> Result<Transform, ParseError> {
    let ctx = SourceContext::new("transform", source);
    let pairs = SvgParser::parse(Rule::transform_list, source)
        .map_err(|e| ParseError::from_pest(e, &ctx, "transform"))?;

    let mut transform = Transform::IDENTITY;
    for pair in pairs {
        if pair.as_rule() == Rule::transform_list {
            for inner in pair.into_inner() {
                if inner.as_rule() == Rule::transform_fn {
                    transform *= parse_transform_fn(inner, &ctx)?;
                }
            }
        }
    }
    Ok(transform)
}

fn parse_transform_fn(pair: Pair<'_, Rule>, ctx: &SourceContext) -> Result<Transform, ParseError> {
    let span = span_of(&pair);
    let mut inner = pair.into_inner();
    let name = inner.next().map(|p| p.as_str()).unwrap_or_default();
    let args = inner
        .map(|p| parse_number(&p, ctx))
        .collect::<Result<Vec<f64>, _>>()?;

    let transform = match (name, args.as_slice()) {
        ("translate", &[tx]) => Transform::translate(tx, 0.0),
        ("translate", &[tx, ty]) => Transform::translate(tx, ty),
        ("scale", &[s]) => Transform::scale(s),
        ("scale", &[sx, sy]) => Transform::scale_xy(sx, sy),
        ("rotate", &[deg]) => Transform::rotate(deg),
        ("rotate", &[deg, cx, cy]) => Transform::rotate_about(deg, dvec2(cx, cy)),
        ("skewX", &[deg]) => Transform::skew_x(deg),
        ("skewY", &[deg]) => Transform::skew_y(deg),
        ("matrix", &[a, b, c, d, e, f]) => Transform::new(a, b, c, d, e, f),
        _ => {
            return Err(ParseError::TransformArguments {
                name: name.to_string(),
                count: args.len(),
                src: ctx.named_source(),
                span,
                expected: expected_arguments(name).map(String::from),
            });
        }
    };
    Ok(transform)
}

fn expected_arguments(name: &str) -> Option<&'static str> {
    match name {
        "translate" => Some("translate takes 1 or 2 numbers"),
        "scale" => Some("scale takes 1 or 2 numbers"),
        "rotate" => Some("rotate takes an angle, optionally followed by a centre x and y"),
        "skewX" | "skewY" => Some("skews take a single angle"),
        "matrix" => Some("matrix takes exactly 6 numbers"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Segment;

    fn letters(path: &Path) -> String {
        path.iter().map(|c| c.letter()).collect()
    }

    // ==================== Path data tests ====================

    #[test]
    fn parse_simple_path() {
        let path = parse_path("M 10 20 L 30 40 Z").unwrap();
        assert_eq!(letters(&path), "MLZ");
        assert_eq!(path.to_string(), "M 10 20 L 30 40 Z");
    }

    #[test]
    fn parse_compact_numbers() {
        let path = parse_path("M1.5e-3-2L.5.5").unwrap();
        assert_eq!(path.commands()[0].args(), vec![1.5e-3, -2.0]);
        assert_eq!(path.commands()[1].args(), vec![0.5, 0.5]);
    }

    #[test]
    fn parse_commas_and_newlines() {
        let path = parse_path("M0,0\n\tL10,0,10,10 z").unwrap();
        assert_eq!(letters(&path), "MLLz");
    }

    #[test]
    fn implicit_repeats() {
        assert_eq!(letters(&parse_path("M 0 0 1 1 2 2").unwrap()), "MLL");
        assert_eq!(letters(&parse_path("m 0 0 1 1").unwrap()), "ml");
        assert_eq!(letters(&parse_path("c 1 1 2 2 3 3 4 4 5 5 6 6").unwrap()), "cc");
        assert_eq!(letters(&parse_path("h 1 2 3").unwrap()), "hhh");
    }

    #[test]
    fn numbers_after_close_start_a_move() {
        let path = parse_path("M 0 0 L 5 5 z 10 10 20 20").unwrap();
        assert_eq!(letters(&path), "MLzML");
        assert_eq!(
            path.commands()[3],
            PathCommand::Absolute(Segment::Move { to: dvec2(10.0, 10.0) })
        );
    }

    #[test]
    fn arc_flags() {
        let path = parse_path("M 0 0 A 5 5 30 1 0 10 0").unwrap();
        match path.commands()[1].segment() {
            Segment::Arc(arc) => {
                assert!(arc.large_arc);
                assert!(!arc.sweep);
                assert_eq!(arc.x_axis_rotation, 30.0);
            }
            other => panic!("expected arc, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_an_empty_path() {
        assert!(parse_path("").unwrap().is_empty());
        assert!(parse_path("  \n ").unwrap().is_empty());
    }

    // ==================== Path error tests ====================

    #[test]
    fn missing_arguments() {
        let err = parse_path("M 0 0 L").unwrap_err();
        assert!(
            matches!(err, ParseError::MissingArguments { letter: 'L', arity: 2, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn partial_argument_group() {
        let err = parse_path("M 0 0 L 1 2 3").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"command `L` takes 2 numbers per segment, 1 left over");
        match err {
            ParseError::ArgumentCount { span, .. } => {
                assert_eq!(span.offset(), 12);
                assert_eq!(span.len(), 1);
            }
            other => panic!("expected ArgumentCount, got {other:?}"),
        }
    }

    #[test]
    fn unknown_letter_is_a_syntax_error() {
        let err = parse_path("M 0 0 X 1 2").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn leading_numbers_are_a_syntax_error() {
        let err = parse_path("10 10 M 0 0").unwrap_err();
        match err {
            ParseError::Syntax { span, .. } => assert_eq!(span.offset(), 0),
            other => panic!("expected Syntax, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_number_is_invalid() {
        let err = parse_path("M 1e999 0").unwrap_err();
        assert!(
            matches!(&err, ParseError::InvalidNumber { text, .. } if text == "1e999"),
            "{err:?}"
        );
    }

    #[test]
    fn named_source_in_diagnostics() {
        let err = parse_path_named("#logo", "M 0").unwrap_err();
        let report = miette::Report::new(err);
        let rendered = format!("{report:?}");
        assert!(rendered.contains("#logo"), "{rendered}");
    }

    // ==================== Transform tests ====================

    #[test]
    fn transform_list_with_separators() {
        let t = parse_transform("translate(10,20), scale(2)  rotate(90 5 5)").unwrap();
        let expected = Transform::translate(10.0, 20.0)
            * Transform::scale(2.0)
            * Transform::rotate_about(90.0, dvec2(5.0, 5.0));
        assert!(t.approx_eq(&expected));
    }

    #[test]
    fn skew_and_matrix() {
        let t = parse_transform("skewX(45) skewY(0) matrix(1 0 0 1 3 4)").unwrap();
        let expected = Transform::skew_x(45.0) * Transform::translate(3.0, 4.0);
        assert!(t.approx_eq(&expected));
    }

    #[test]
    fn transform_argument_counts() {
        for bad in ["translate()", "rotate(1 2)", "skewX(1 2)", "matrix(1 2 3)", "scale(1 2 3)"] {
            let err = parse_transform(bad).unwrap_err();
            assert!(
                matches!(err, ParseError::TransformArguments { .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn unknown_transform_function() {
        let err = parse_transform("shear(10)").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn unbalanced_parenthesis() {
        let err = parse_transform("translate(10").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "{err:?}");
    }
}
