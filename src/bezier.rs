//! Cubic bezier numerics.
//!
//! A cubic is written as its four points `[start, ctrl1, ctrl2, end]`. The
//! functions here evaluate, split and measure single cubics; the superpath
//! functions at the bottom fold them over every segment of a
//! [`CubicSuperPath`].

use std::f64::consts::PI;

use crate::errors::GeometryError;
use crate::log::trace;
use crate::path::{CubicNode, CubicSuperPath};
use crate::types::{DirectedLineSegment, Vector, VectorExt};

/// Four bezier points: start, first control, second control, end.
pub type Bezier = [Vector; 4];

/// Default tolerance for length integration and length searches.
pub const LENGTH_TOLERANCE: f64 = 0.001;

/// Interval count at which Simpson integration stops refining.
const SIMPSON_LIMIT: usize = 4096;

/// Bisection steps before a length search gives up refining.
const MAX_BISECTION_STEPS: usize = 64;

/// Subdivision depth cap for a single segment.
const MAX_SUBDIVISION_DEPTH: u32 = 16;

/// Area below which an outline has no centre of mass.
const MIN_AREA: f64 = 1e-8;

/// Polynomial coefficients `[a, b, c, d]` with `B(t) = a t³ + b t² + c t + d`.
pub fn parameterize(bez: &Bezier) -> [Vector; 4] {
    let [p0, p1, p2, p3] = *bez;
    let c = 3.0 * (p1 - p0);
    let b = 3.0 * (p2 - p1) - c;
    let a = p3 - p0 - c - b;
    [a, b, c, p0]
}

/// Point on the curve at parameter `t`.
pub fn point_at(bez: &Bezier, t: f64) -> Vector {
    let [a, b, c, d] = parameterize(bez);
    ((a * t + b) * t + c) * t + d
}

/// Derivative `B'(t)`.
pub fn slope_at(bez: &Bezier, t: f64) -> Vector {
    let [a, b, c, _] = parameterize(bez);
    (3.0 * a * t + 2.0 * b) * t + c
}

/// Parameters in `[0, 1]` where the tangent is parallel to `direction`.
///
/// A zero direction matches nothing.
pub fn t_at_slope(bez: &Bezier, direction: Vector) -> Vec<f64> {
    if direction == Vector::ZERO {
        return Vec::new();
    }
    let [a, b, c, _] = parameterize(bez);
    // B'(t) x direction = 0
    let roots = real_roots(
        0.0,
        3.0 * a.cross(direction),
        2.0 * b.cross(direction),
        c.cross(direction),
    );
    roots.into_iter().filter(|t| (0.0..=1.0).contains(t)).collect()
}

/// Real roots of `a x³ + b x² + c x + d`.
///
/// Leading zero coefficients drop the degree; the all-zero polynomial has no
/// roots reported. Repeated roots appear once.
pub fn real_roots(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a != 0.0 {
        return cubic_roots(b / a, c / a, d / a);
    }
    if b != 0.0 {
        let det = c * c - 4.0 * b * d;
        if det > 0.0 {
            let root = det.sqrt();
            return vec![(-c + root) / (2.0 * b), (-c - root) / (2.0 * b)];
        }
        if det == 0.0 {
            return vec![-c / (2.0 * b)];
        }
        return Vec::new();
    }
    if c != 0.0 {
        return vec![-d / c];
    }
    Vec::new()
}

// x³ + b x² + c x + d, through the depressed cubic t³ + p t + q
fn cubic_roots(b: f64, c: f64, d: f64) -> Vec<f64> {
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let disc = (q / 2.0).powi(2) + (p / 3.0).powi(3);

    let roots = if disc > 0.0 {
        let root = disc.sqrt();
        vec![(-q / 2.0 + root).cbrt() + (-q / 2.0 - root).cbrt()]
    } else if p == 0.0 {
        vec![0.0]
    } else if disc == 0.0 {
        vec![3.0 * q / p, -3.0 * q / (2.0 * p)]
    } else {
        let m = 2.0 * (-p / 3.0).sqrt();
        let phi = ((3.0 * q / (2.0 * p)) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0).acos() / 3.0;
        (0..3)
            .map(|k| m * (phi - 2.0 * PI * k as f64 / 3.0).cos())
            .collect()
    };
    roots.into_iter().map(|t| t - shift).collect()
}

/// Points where the infinite line through `line` crosses the curve.
pub fn line_intersect(line: &DirectedLineSegment, bez: &Bezier) -> Vec<Vector> {
    let direction = line.vector();
    if direction == Vector::ZERO {
        return Vec::new();
    }
    let [a, b, c, d] = parameterize(bez);
    let roots = real_roots(
        direction.cross(a),
        direction.cross(b),
        direction.cross(c),
        direction.cross(d - line.start),
    );
    roots
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .map(|t| point_at(bez, t))
        .collect()
}

/// De Casteljau split at `t`.
pub fn split_at(bez: &Bezier, t: f64) -> (Bezier, Bezier) {
    let [p0, p1, p2, p3] = *bez;
    let m1 = p0.lerp(p1, t);
    let m2 = p1.lerp(p2, t);
    let m3 = p2.lerp(p3, t);
    let m4 = m1.lerp(m2, t);
    let m5 = m2.lerp(m3, t);
    let m = m4.lerp(m5, t);
    ([p0, m1, m4, m], [m, m5, m3, p3])
}

/// Arc length over `[0, 1]`.
pub fn length(bez: &Bezier, tolerance: f64) -> f64 {
    length_to(bez, tolerance, 1.0)
}

/// Arc length over `[0, t]`, by Simpson's rule with the interval count
/// doubling until two estimates agree within `tolerance`.
pub fn length_to(bez: &Bezier, tolerance: f64, t: f64) -> f64 {
    let [a, b, c, _] = parameterize(bez);
    let speed = |s: f64| ((3.0 * a * s + 2.0 * b) * s + c).length();

    let mut n = 2;
    let mut interval = t / 2.0;
    let ends = speed(0.0) + speed(t);
    let mut even_sum = 0.0;
    let mut odd_sum = speed(interval);
    let mut estimate = interval / 3.0 * (ends + 4.0 * odd_sum);
    let mut previous = 2.0 * estimate;

    while n < SIMPSON_LIMIT && (estimate - previous).abs() > tolerance {
        n *= 2;
        interval /= 2.0;
        even_sum += odd_sum;
        odd_sum = (1..n).step_by(2).map(|i| speed(i as f64 * interval)).sum();
        previous = estimate;
        estimate = interval / 3.0 * (ends + 2.0 * even_sum + 4.0 * odd_sum);
    }
    estimate
}

/// Parameter at which the arc length reaches `fraction` of the total.
pub fn t_at_length(bez: &Bezier, fraction: f64, tolerance: f64) -> f64 {
    let total = length(bez, tolerance);
    let target = fraction * total;
    let mut t = 1.0;
    let mut step = 1.0;
    let mut diff = total - target;
    let mut steps = 0;
    while diff.abs() > tolerance && steps < MAX_BISECTION_STEPS {
        step /= 2.0;
        if diff < 0.0 {
            t += step;
        } else {
            t -= step;
        }
        diff = length_to(bez, tolerance, t) - target;
        steps += 1;
    }
    trace!(fraction, t, steps, "length search");
    t
}

/// Split where the arc length reaches `fraction` of the total.
pub fn split_at_length(bez: &Bezier, fraction: f64, tolerance: f64) -> (Bezier, Bezier) {
    split_at(bez, t_at_length(bez, fraction, tolerance))
}

/// Furthest distance from a control point to the chord.
pub fn max_distance(bez: &Bezier) -> f64 {
    let chord = DirectedLineSegment::new(bez[0], bez[3]);
    chord
        .distance_to_point(bez[1])
        .max(chord.distance_to_point(bez[2]))
}

// ============================================================================
// Superpath measures
// ============================================================================

/// Length of every segment, per subpath, and the total.
pub fn superpath_length(csp: &CubicSuperPath, tolerance: f64) -> (Vec<Vec<f64>>, f64) {
    let lengths: Vec<Vec<f64>> = csp
        .subpaths
        .iter()
        .map(|subpath| {
            subpath
                .segments()
                .iter()
                .map(|bez| length(bez, tolerance))
                .collect()
        })
        .collect();
    let total = lengths.iter().flatten().sum();
    (lengths, total)
}

/// Split segments in half until every control point lies within `flatness`
/// of its chord. Closing segments are left as they are.
pub fn subdivide(csp: &mut CubicSuperPath, flatness: f64) {
    for subpath in &mut csp.subpaths {
        let mut nodes: Vec<CubicNode> = Vec::with_capacity(subpath.nodes.len());
        for node in subpath.nodes.iter().copied() {
            match nodes.last_mut() {
                None => nodes.push(node),
                Some(last) => {
                    let bez = [last.point, last.outgoing, node.incoming, node.point];
                    let mut pieces = Vec::new();
                    flatten_into(bez, flatness, 0, &mut pieces);
                    let mut pieces = pieces.into_iter();
                    if let Some(first) = pieces.next() {
                        last.outgoing = first[1];
                        let mut incoming = first[2];
                        let mut point = first[3];
                        for piece in pieces {
                            nodes.push(CubicNode {
                                incoming,
                                point,
                                outgoing: piece[1],
                            });
                            incoming = piece[2];
                            point = piece[3];
                        }
                        nodes.push(CubicNode {
                            incoming,
                            point,
                            outgoing: node.outgoing,
                        });
                    }
                }
            }
        }
        subpath.nodes = nodes;
    }
}

fn flatten_into(bez: Bezier, flatness: f64, depth: u32, out: &mut Vec<Bezier>) {
    if depth >= MAX_SUBDIVISION_DEPTH || max_distance(&bez) <= flatness {
        out.push(bez);
        return;
    }
    let (first, second) = split_at(&bez, 0.5);
    flatten_into(first, flatness, depth + 1, out);
    flatten_into(second, flatness, depth + 1, out);
}

// Closed outline segments of one subpath: its segments, plus a straight
// return to the start when the subpath is open.
fn outline(csp: &CubicSuperPath) -> impl Iterator<Item = Bezier> + '_ {
    csp.subpaths
        .iter()
        .filter(|subpath| subpath.nodes.len() > 1)
        .flat_map(|subpath| {
            let mut segments = subpath.segments();
            if let (false, Some(first), Some(last)) =
                (subpath.closed, subpath.nodes.first(), subpath.nodes.last())
            {
                segments.push(line_bezier(last.point, first.point));
            }
            segments
        })
}

fn line_bezier(from: Vector, to: Vector) -> Bezier {
    [from, from.lerp(to, 1.0 / 3.0), from.lerp(to, 2.0 / 3.0), to]
}

// Weights of x_i y_j - x_j y_i in the exact area integral of a cubic
const AREA_WEIGHTS: [(usize, usize, f64); 6] = [
    (0, 1, 3.0 / 10.0),
    (0, 2, 3.0 / 20.0),
    (0, 3, 1.0 / 20.0),
    (1, 2, 3.0 / 20.0),
    (1, 3, 3.0 / 20.0),
    (2, 3, 3.0 / 10.0),
];

// (1/2) ∮ x dy - y dx over one cubic
fn segment_area(bez: &Bezier) -> f64 {
    AREA_WEIGHTS
        .iter()
        .map(|&(i, j, w)| w * bez[i].cross(bez[j]))
        .sum()
}

fn enclosed_area(csp: &CubicSuperPath) -> f64 {
    outline(csp).map(|bez| segment_area(&bez)).sum()
}

/// Signed area enclosed by the superpath, open subpaths closed by a straight
/// line. Positive for outlines running clockwise on screen (y down).
pub fn area(csp: &CubicSuperPath) -> f64 {
    -enclosed_area(csp)
}

// 5-point Gauss-Legendre nodes and weights on [-1, 1]
const GAUSS_LEGENDRE: [(f64, f64); 5] = [
    (0.0, 0.568_888_888_888_888_9),
    (-0.538_469_310_105_683_1, 0.478_628_670_499_366_5),
    (0.538_469_310_105_683_1, 0.478_628_670_499_366_5),
    (-0.906_179_845_938_664_0, 0.236_926_885_056_189_1),
    (0.906_179_845_938_664_0, 0.236_926_885_056_189_1),
];

/// Centroid of the area enclosed by the superpath.
pub fn center_of_mass(csp: &CubicSuperPath) -> Result<Vector, GeometryError> {
    let enclosed = enclosed_area(csp);
    if enclosed.abs() < MIN_AREA {
        return Err(GeometryError::ZeroArea);
    }
    // x̄ = ∮ x² dy / 2A, ȳ = -∮ y² dx / 2A; the integrands are degree 8 in t
    let mut moment = Vector::ZERO;
    for bez in outline(csp) {
        for &(node, weight) in &GAUSS_LEGENDRE {
            let t = (node + 1.0) / 2.0;
            let p = point_at(&bez, t);
            let dp = slope_at(&bez, t);
            moment.x += weight / 2.0 * p.x * p.x * dp.y;
            moment.y -= weight / 2.0 * p.y * p.y * dp.x;
        }
    }
    Ok(moment / (2.0 * enclosed))
}
