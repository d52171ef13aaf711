//! TikZ path and transform emission.
//!
//! Coordinates are written as they are, so a drawing appears mirrored in
//! TikZ's y-up frame unless `reverse_y` gives the page height to flip about.
//! Mirroring negates arc angles and rotations, and conjugates matrices.

use std::f64::consts::PI;

use glam::dvec2;

use crate::format::round_to;
use crate::log::debug;
use crate::path::{CubicCurve, Path, Segment};
use crate::transform::{Transform, TransformKind};
use crate::types::Vector;

/// Output options for the TikZ emitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TikzOptions {
    /// Decimal places kept for every number.
    pub round_number: u32,
    /// Page height; when set, `y` is written as `height - y`.
    pub reverse_y: Option<f64>,
}

impl Default for TikzOptions {
    fn default() -> Self {
        Self {
            round_number: 4,
            reverse_y: None,
        }
    }
}

impl TikzOptions {
    pub fn num(&self, value: f64) -> String {
        round_to(value, self.round_number).to_string()
    }

    /// `(x, y)` after the optional y reversal.
    pub fn coord(&self, point: Vector) -> String {
        let point = self.map(point);
        format!("({}, {})", self.num(point.x), self.num(point.y))
    }

    fn map(&self, point: Vector) -> Vector {
        match self.reverse_y {
            Some(height) => dvec2(point.x, height - point.y),
            None => point,
        }
    }
}

/// Start and end angle of an unrotated-frame arc, in degrees, with the radii
/// actually used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcAngles {
    pub start: f64,
    pub end: f64,
    pub radii: Vector,
}

/// Angles of the SVG arc from `from` to `to` measured on its ellipse, in the
/// ellipse's own (unrotated) frame.
///
/// The end angle is greater than the start angle when the arc sweeps in the
/// positive direction. Radii too small to span the chord are scaled up.
pub fn calc_arc(
    from: Vector,
    radii: Vector,
    x_axis_rotation: f64,
    large_arc: bool,
    sweep: bool,
    to: Vector,
) -> ArcAngles {
    let (sin, cos) = x_axis_rotation.to_radians().sin_cos();
    let mut r = radii.abs();

    let half = (from - to) * 0.5;
    let along = (cos * half.x + sin * half.y).powi(2);
    let across = (cos * half.y - sin * half.x).powi(2);
    let ratio = |v: f64, r: f64| if r > 0.0 { v / (r * r) } else { 0.0 };
    let lambda = ratio(along, r.x) + ratio(across, r.y);
    if lambda > 1.0 {
        debug!(?r, lambda, "arc radii scaled up to reach the end point");
        r *= lambda.sqrt();
    }

    let inv = |v: f64| if v > 0.0 { 1.0 / v } else { 0.0 };
    let to_unit = |p: Vector| {
        dvec2(
            inv(r.x) * (cos * p.x + sin * p.y),
            inv(r.y) * (-sin * p.x + cos * p.y),
        )
    };
    let p0 = to_unit(from);
    let p1 = to_unit(to);

    let chord2 = p0.distance_squared(p1);
    let s_q = if chord2 > 0.0 { 1.0 / chord2 - 0.25 } else { -0.25 };
    let mut offset = s_q.max(0.0).sqrt();
    if large_arc == sweep {
        offset = -offset;
    }
    let center = dvec2(
        0.5 * (p0.x + p1.x) - offset * (p1.y - p0.y),
        0.5 * (p0.y + p1.y) + offset * (p1.x - p0.x),
    );

    let angle_0 = (p0.y - center.y).atan2(p0.x - center.x);
    let angle_1 = (p1.y - center.y).atan2(p1.x - center.x);
    let mut swept = angle_1 - angle_0;
    if swept < 0.0 && sweep {
        swept += 2.0 * PI;
    } else if swept > 0.0 && !sweep {
        swept -= 2.0 * PI;
    }

    let mut start = angle_0.to_degrees();
    let mut end = angle_1.to_degrees();
    if swept > 0.0 {
        if angle_0 >= angle_1 {
            start -= 360.0;
        }
    } else if angle_0 < angle_1 {
        end -= 360.0;
    }
    ArcAngles {
        start,
        end,
        radii: r,
    }
}

/// Bring arc angles into `(-360, 360)` while keeping their order.
pub fn sanitize_angles(start_raw: f64, end_raw: f64, round_number: u32) -> (f64, f64) {
    let mut start = round_to(start_raw.rem_euclid(360.0), round_number);
    let mut end = round_to(end_raw.rem_euclid(360.0), round_number);
    if start_raw < end_raw && start >= end {
        start -= 360.0;
    } else if start_raw > end_raw && start <= end {
        end -= 360.0;
    }
    (start, end)
}

/// TikZ path operations for `path`, without the `\draw` and the `;`.
pub fn path_to_tikz(path: &Path, opts: &TikzOptions) -> String {
    let mut out = String::new();
    for (pen, command) in path.walk() {
        let previous = pen.previous;
        let points = command.control_points(&pen);
        match command.absolute_segment(previous) {
            Segment::Move { to } => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(&opts.coord(to));
            }
            Segment::Line { .. } | Segment::Horizontal { .. } | Segment::Vertical { .. } => {
                if let Some(to) = points.first() {
                    out.push_str(&format!(" -- {}", opts.coord(*to)));
                }
            }
            Segment::Cubic { .. } | Segment::SmoothCubic { .. } => {
                if let [ctrl1, ctrl2, to] = points[..] {
                    push_curve(&mut out, opts, &CubicCurve { ctrl1, ctrl2, to });
                }
            }
            Segment::Quadratic { .. } | Segment::SmoothQuadratic { .. } => {
                if let [ctrl, to] = points[..] {
                    push_curve(&mut out, opts, &CubicCurve::from_quadratic(previous, ctrl, to));
                }
            }
            Segment::Arc(arc) => {
                if arc.to == previous {
                    continue;
                }
                if arc.rx == 0.0 || arc.ry == 0.0 {
                    out.push_str(&format!(" -- {}", opts.coord(arc.to)));
                    continue;
                }
                let angles = calc_arc(
                    previous,
                    dvec2(arc.rx, arc.ry),
                    arc.x_axis_rotation,
                    arc.large_arc,
                    arc.sweep,
                    arc.to,
                );
                let (mut start, mut end, mut rotation) =
                    (angles.start, angles.end, arc.x_axis_rotation);
                if opts.reverse_y.is_some() {
                    start = -start;
                    end = -end;
                    rotation = -rotation;
                }
                let (start, end) = sanitize_angles(start, end, opts.round_number);
                let rx = opts.num(angles.radii.x);
                let ry = opts.num(angles.radii.y);
                let radii = if rx == ry { rx } else { format!("{rx} and {ry}") };
                let rotation = round_to(rotation, opts.round_number);
                let arc_op = format!(
                    "arc({}:{}:{radii})",
                    opts.num(start),
                    opts.num(end)
                );
                if rotation != 0.0 {
                    out.push_str(&format!(" {{[rotate={}] {arc_op}}}", opts.num(rotation)));
                } else {
                    out.push_str(&format!(" {arc_op}"));
                }
            }
            Segment::Close => out.push_str(" -- cycle"),
        }
    }
    out
}

fn push_curve(out: &mut String, opts: &TikzOptions, curve: &CubicCurve) {
    out.push_str(&format!(
        " .. controls {} and {} .. {}",
        opts.coord(curve.ctrl1),
        opts.coord(curve.ctrl2),
        opts.coord(curve.to)
    ));
}

/// TikZ transformation options equivalent to `t`.
///
/// With y reversal the transform is conjugated by the mirror `y -> h - y`,
/// which negates rotations and the off-diagonal terms and adds a shift.
pub fn transform_to_tikz(t: &Transform, opts: &TikzOptions) -> Vec<String> {
    if t.is_identity() {
        return Vec::new();
    }
    let height = opts.reverse_y;
    let flip = if height.is_some() { -1.0 } else { 1.0 };
    match t.classify(false) {
        TransformKind::Translate => {
            vec![format!("shift={{{}}}", shift(opts, t.e, flip * t.f))]
        }
        TransformKind::Rotate => match t.rotation_degrees() {
            Ok(degrees) => match height {
                Some(h) => vec![format!(
                    "rotate around={{{}:({}, {})}}",
                    opts.num(-degrees),
                    opts.num(0.0),
                    opts.num(h)
                )],
                None => vec![format!("rotate={}", opts.num(degrees))],
            },
            Err(_) => vec![matrix_option(t, opts)],
        },
        TransformKind::Scale => {
            let mut options = Vec::new();
            if let Some(h) = height {
                let dy = (1.0 - t.d) * h;
                if round_to(dy, opts.round_number) != 0.0 {
                    options.push(format!("shift={{{}}}", shift(opts, 0.0, dy)));
                }
            }
            let x = opts.num(t.a);
            let y = opts.num(t.d);
            if x == y {
                options.push(format!("scale={x}"));
            } else {
                options.push(format!("xscale={x},yscale={y}"));
            }
            options
        }
        TransformKind::Matrix => vec![matrix_option(t, opts)],
    }
}

fn shift(opts: &TikzOptions, x: f64, y: f64) -> String {
    format!("({}, {})", opts.num(x), opts.num(y))
}

fn matrix_option(t: &Transform, opts: &TikzOptions) -> String {
    let (b, c, e, f) = match opts.reverse_y {
        Some(h) => (-t.b, -t.c, t.e + t.c * h, -t.f + (1.0 - t.d) * h),
        None => (t.b, t.c, t.e, t.f),
    };
    format!(
        "cm={{{},{},{},{},{}}}",
        opts.num(t.a),
        opts.num(b),
        opts.num(c),
        opts.num(t.d),
        shift(opts, e, f)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tikz(d: &str, opts: &TikzOptions) -> String {
        let path: Path = d.parse().unwrap();
        path_to_tikz(&path, opts)
    }

    fn reversed(height: f64) -> TikzOptions {
        TikzOptions {
            reverse_y: Some(height),
            ..TikzOptions::default()
        }
    }

    // ==================== Path tests ====================

    #[test]
    fn lines_and_cycle() {
        insta::assert_snapshot!(
            tikz("M 0 0 L 10 0 V 10 h -10 Z", &TikzOptions::default()),
            @"(0, 0) -- (10, 0) -- (10, 10) -- (0, 10) -- cycle"
        );
    }

    #[test]
    fn reversed_lines() {
        insta::assert_snapshot!(
            tikz("M 0 0 L 10 0 L 10 10 Z", &reversed(10.0)),
            @"(0, 10) -- (10, 10) -- (10, 0) -- cycle"
        );
    }

    #[test]
    fn curves_become_controls() {
        insta::assert_snapshot!(
            tikz("M 0 0 C 0 10 10 10 10 0 S 20 -10 20 0", &TikzOptions::default()),
            @"(0, 0) .. controls (0, 10) and (10, 10) .. (10, 0) .. controls (10, -10) and (20, -10) .. (20, 0)"
        );
    }

    #[test]
    fn quadratics_are_elevated() {
        insta::assert_snapshot!(
            tikz("M 0 0 Q 3 6 6 0", &TikzOptions::default()),
            @"(0, 0) .. controls (2, 4) and (4, 4) .. (6, 0)"
        );
    }

    #[test]
    fn rounding() {
        let opts = TikzOptions {
            round_number: 2,
            ..TikzOptions::default()
        };
        assert_eq!(tikz("M 0.123456 -0.001 L 1.005 2", &opts), "(0.12, 0) -- (1, 2)");
    }

    #[test]
    fn extreme_magnitudes_stay_finite() {
        let opts = TikzOptions::default();
        assert_eq!(opts.num(1e306), 1e306_f64.to_string());
        assert_eq!(opts.num(-1e-310), "0");
        assert!(!tikz("M 1e306 0 L 0 -1e307", &opts).contains("inf"));
    }

    #[test]
    fn subpaths_are_separated() {
        insta::assert_snapshot!(
            tikz("M 0 0 L 1 1 M 5 5 L 6 6", &TikzOptions::default()),
            @"(0, 0) -- (1, 1) (5, 5) -- (6, 6)"
        );
    }

    // ==================== Arc tests ====================

    #[test]
    fn half_circle_arc() {
        insta::assert_snapshot!(
            tikz("M 0 0 A 5 5 0 0 1 10 0", &TikzOptions::default()),
            @"(0, 0) arc(-180:0:5)"
        );
    }

    #[test]
    fn reversed_arc_mirrors_angles() {
        insta::assert_snapshot!(
            tikz("M 0 0 A 5 5 0 0 1 10 0", &reversed(10.0)),
            @"(0, 10) arc(180:0:5)"
        );
    }

    #[test]
    fn elliptic_and_rotated_arcs() {
        let out = tikz("M 0 0 A 10 5 0 0 1 20 0", &TikzOptions::default());
        assert!(out.ends_with("arc(-180:0:10 and 5)"), "{out}");
        let out = tikz("M 0 0 A 10 5 30 0 1 20 0", &TikzOptions::default());
        assert!(out.contains("{[rotate=30] arc("), "{out}");
        // the chord is too long for these radii, which grow by sqrt(1.75)
        assert!(out.ends_with(":13.2288 and 6.6144)}"), "{out}");
    }

    #[test]
    fn degenerate_arcs() {
        assert_eq!(tikz("M 0 0 A 0 5 0 0 1 10 0", &TikzOptions::default()), "(0, 0) -- (10, 0)");
        assert_eq!(tikz("M 3 3 A 5 5 0 0 1 3 3", &TikzOptions::default()), "(3, 3)");
    }

    #[test]
    fn calc_arc_scales_small_radii() {
        let angles = calc_arc(Vector::ZERO, dvec2(1.0, 1.0), 0.0, false, true, dvec2(10.0, 0.0));
        assert!((angles.radii.x - 5.0).abs() < 1e-9);
        assert!((angles.radii.y - 5.0).abs() < 1e-9);
        assert!(angles.end > angles.start);
    }

    #[test]
    fn calc_arc_direction_follows_sweep() {
        let up = calc_arc(Vector::ZERO, dvec2(5.0, 5.0), 0.0, false, true, dvec2(5.0, 5.0));
        let down = calc_arc(Vector::ZERO, dvec2(5.0, 5.0), 0.0, false, false, dvec2(5.0, 5.0));
        assert!(up.end > up.start);
        assert!(down.end < down.start);
        assert!(((up.end - up.start) - 90.0).abs() < 1e-9);
        let large = calc_arc(Vector::ZERO, dvec2(5.0, 5.0), 0.0, true, true, dvec2(5.0, 5.0));
        assert!(((large.end - large.start) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn angle_sanitizing() {
        assert_eq!(sanitize_angles(-180.0, 0.0, 4), (-180.0, 0.0));
        assert_eq!(sanitize_angles(350.0, 370.0, 4), (-10.0, 10.0));
        assert_eq!(sanitize_angles(-450.0, -400.0, 4), (270.0, 320.0));
        assert_eq!(sanitize_angles(10.0, -10.0, 4), (10.0, -10.0));
        assert_eq!(sanitize_angles(720.0, 0.0, 4), (0.0, -360.0));
    }

    // ==================== Transform tests ====================

    #[test]
    fn transform_options() {
        let opts = TikzOptions::default();
        assert!(transform_to_tikz(&Transform::IDENTITY, &opts).is_empty());
        assert_eq!(
            transform_to_tikz(&Transform::translate(10.0, 20.0), &opts),
            vec!["shift={(10, 20)}"]
        );
        assert_eq!(transform_to_tikz(&Transform::rotate(30.0), &opts), vec!["rotate=30"]);
        assert_eq!(transform_to_tikz(&Transform::scale(2.0), &opts), vec!["scale=2"]);
        assert_eq!(
            transform_to_tikz(&Transform::scale_xy(2.0, 3.0), &opts),
            vec!["xscale=2,yscale=3"]
        );
        assert_eq!(
            transform_to_tikz(&Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0), &opts),
            vec!["cm={1,2,3,4,(5, 6)}"]
        );
    }

    #[test]
    fn reversed_transform_options() {
        let opts = reversed(100.0);
        assert_eq!(
            transform_to_tikz(&Transform::translate(10.0, 20.0), &opts),
            vec!["shift={(10, -20)}"]
        );
        assert_eq!(
            transform_to_tikz(&Transform::rotate(30.0), &opts),
            vec!["rotate around={-30:(0, 100)}"]
        );
        assert_eq!(
            transform_to_tikz(&Transform::scale_xy(2.0, 3.0), &opts),
            vec!["shift={(0, -200)}", "xscale=2,yscale=3"]
        );
        assert_eq!(
            transform_to_tikz(&Transform::scale_xy(2.0, 1.0), &opts),
            vec!["xscale=2,yscale=1"]
        );
        assert_eq!(
            transform_to_tikz(&Transform::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0), &opts),
            vec!["cm={1,-2,-3,4,(305, -306)}"]
        );
    }

    #[test]
    fn reversed_matrix_agrees_with_mirrored_points() {
        // mirror(t(p)) == t'(mirror(p)) for the emitted t'
        let h = 50.0;
        let t = Transform::new(1.5, 0.5, -0.25, 2.0, 3.0, -4.0);
        let mirrored = Transform::new(1.5, -0.5, 0.25, 2.0, 3.0 + -0.25 * h, 4.0 + (1.0 - 2.0) * h);
        for p in [dvec2(0.0, 0.0), dvec2(7.0, -2.0), dvec2(-3.0, 11.0)] {
            let direct = t.apply_to_point(p);
            let expected = dvec2(direct.x, h - direct.y);
            let got = mirrored.apply_to_point(dvec2(p.x, h - p.y));
            assert!((expected - got).length() < 1e-9, "{expected} vs {got}");
        }
        let opts = reversed(h);
        assert_eq!(transform_to_tikz(&t, &opts), vec!["cm={1.5,-0.5,0.25,2,(-9.5, -46)}"]);
    }
}
