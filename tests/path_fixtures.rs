use datatest_stable::Utf8Path;
use tikzpath::bezier::point_at;
use tikzpath::{BoundingBox, Path, PathCommand, Vector};

/// Tolerance for comparing coordinates after conversions
const FLOAT_TOLERANCE: f64 = 1e-6;

/// Samples per curve when checking the bounding box
const SAMPLES: usize = 256;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= FLOAT_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn commands_match(a: &PathCommand, b: &PathCommand) -> bool {
    let (args_a, args_b) = (a.args(), b.args());
    a.letter() == b.letter()
        && args_a.len() == args_b.len()
        && args_a.iter().zip(&args_b).all(|(x, y)| close(*x, *y))
}

fn compare_paths(what: &str, left: &Path, right: &Path) -> Result<(), String> {
    if left.len() != right.len() {
        return Err(format!(
            "{what}: {} commands vs {}\n  left:  {left}\n  right: {right}",
            left.len(),
            right.len()
        ));
    }
    for (index, (a, b)) in left.iter().zip(right.iter()).enumerate() {
        if !commands_match(a, b) {
            return Err(format!("{what}: command {index} differs: `{a}` vs `{b}`"));
        }
    }
    Ok(())
}

fn contains(bbox: &BoundingBox, p: Vector) -> bool {
    let slack = |v: f64| FLOAT_TOLERANCE * v.abs().max(1.0);
    p.x >= bbox.x.minimum - slack(p.x)
        && p.x <= bbox.x.maximum + slack(p.x)
        && p.y >= bbox.y.minimum - slack(p.y)
        && p.y <= bbox.y.maximum + slack(p.y)
}

fn check_bounding_box(path: &Path) -> Result<(), String> {
    let Some(bbox) = path.bounding_box() else {
        return if path.is_empty() {
            Ok(())
        } else {
            Err("non-empty path without a bounding box".to_string())
        };
    };
    for (pen, command) in path.walk() {
        let end = command.end_point(&pen);
        if !contains(&bbox, end) {
            return Err(format!("end point {end} of `{command}` outside {bbox:?}"));
        }
        let Ok(curves) = command.to_curves(&pen) else {
            continue;
        };
        let mut from = pen.previous;
        for curve in curves {
            let bez = [from, curve.ctrl1, curve.ctrl2, curve.to];
            for i in 0..=SAMPLES {
                let p = point_at(&bez, i as f64 / SAMPLES as f64);
                if !contains(&bbox, p) {
                    return Err(format!("sample {p} of `{command}` outside {bbox:?}"));
                }
            }
            from = curve.to;
        }
    }
    Ok(())
}

fn test_path_file(path: &Utf8Path) -> datatest_stable::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let parsed: Path = source.trim().parse()?;

    // Round trip through serialization
    let reparsed: Path = parsed.to_string().parse()?;
    compare_paths(
        "round trip",
        &reparsed.to_non_shorthand(),
        &parsed.to_non_shorthand(),
    )?;

    // Absolute/relative duality
    let absolute = parsed.to_absolute();
    compare_paths("duality", &parsed.to_relative().to_absolute(), &absolute)?;
    if parsed.to_relative().iter().any(PathCommand::is_absolute) {
        return Err(format!("{path}: to_relative left absolute commands").into());
    }

    // Idempotence
    compare_paths("to_absolute twice", &absolute.to_absolute(), &absolute)?;
    let non_shorthand = parsed.to_non_shorthand();
    compare_paths(
        "to_non_shorthand twice",
        &non_shorthand.to_non_shorthand(),
        &non_shorthand,
    )?;

    // Analytic bounds cover the sampled curves
    check_bounding_box(&parsed)?;

    // Geometry survives the cubic superpath form
    let rebuilt = parsed.to_superpath().to_path(false);
    if let (Some(a), Some(b)) = (parsed.bounding_box(), rebuilt.bounding_box()) {
        let same = close(a.x.minimum, b.x.minimum)
            && close(a.x.maximum, b.x.maximum)
            && close(a.y.minimum, b.y.minimum)
            && close(a.y.maximum, b.y.maximum);
        if !same {
            return Err(format!("{path}: superpath bounds {b:?} differ from {a:?}").into());
        }
    }

    Ok(())
}

datatest_stable::harness! {
    { test = test_path_file, root = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"), pattern = r"\.path$" },
}
