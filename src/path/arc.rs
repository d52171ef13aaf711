//! Elliptical arc to cubic bezier flattening.

use std::f64::consts::{FRAC_PI_2, PI};

use glam::{DMat2, dvec2};

use super::command::ArcSegment;
use super::superpath::CubicNode;
use crate::log::{debug, trace};
use crate::types::Vector;

/// Approximate an arc drawn from `start` by cubic bezier nodes.
///
/// The ellipse is mapped to a unit circle, the swept angle is cut into
/// sectors of at most a quarter turn and each sector becomes one cubic with
/// handle length `4/3 * tan(sector/4)`. The first node has no incoming handle
/// and the last has no outgoing handle (both equal the node). Radii too small
/// to reach the end point are scaled up until they do.
///
/// A zero radius or an arc that ends where it starts draws nothing: the
/// result is the two end points with retracted handles.
pub fn arc_to_path(start: Vector, arc: &ArcSegment) -> Vec<CubicNode> {
    let end = arc.to;
    if arc.rx == 0.0 || arc.ry == 0.0 || start == end {
        debug!(?start, ?end, "degenerate arc drawn as a point pair");
        return vec![CubicNode::corner(start), CubicNode::corner(end)];
    }

    let theta = arc.x_axis_rotation.to_radians();
    let rotation = DMat2::from_angle(theta);
    let mut rx = arc.rx.abs();
    let mut ry = arc.ry.abs();
    let to_unit = |rx: f64, ry: f64| {
        rotation * DMat2::from_diagonal(dvec2(1.0 / rx, 1.0 / ry)) * rotation.transpose()
    };

    let mut a = to_unit(rx, ry) * start;
    let mut b = to_unit(rx, ry) * end;
    let mut chord2 = a.distance_squared(b);
    if chord2 > 4.0 {
        // the chord is longer than the unit circle's diameter
        let grow = chord2.sqrt() / 2.0;
        debug!(rx, ry, grow, "arc radii scaled up to reach the end point");
        rx *= grow;
        ry *= grow;
        a /= grow;
        b /= grow;
        chord2 = a.distance_squared(b);
    }

    // unit normal of AB, and the distance from the chord midpoint to the centre
    let normal = dvec2(-(b.y - a.y), b.x - a.x) / chord2.sqrt();
    let mut offset = (1.0 - chord2 / 4.0).max(0.0).sqrt();
    if arc.large_arc == arc.sweep {
        offset = -offset;
    }
    let center = (a + b) / 2.0 + offset * normal;

    let angle_of = |p: Vector| {
        let v = p - center;
        let angle = (v.x / v.length()).clamp(-1.0, 1.0).acos();
        if v.y < 0.0 { -angle } else { angle }
    };
    let start_angle = angle_of(a);
    let mut end_angle = angle_of(b);
    if arc.sweep && start_angle > end_angle {
        end_angle += 2.0 * PI;
    }
    if !arc.sweep && start_angle < end_angle {
        end_angle -= 2.0 * PI;
    }

    let sectors = ((start_angle - end_angle).abs() / FRAC_PI_2) as usize + 1;
    let step = (end_angle - start_angle) / sectors as f64;
    let handle = 4.0 * (step / 4.0).tan() / 3.0;
    trace!(sectors, step, "flattening arc");

    let from_unit = rotation * DMat2::from_diagonal(dvec2(rx, ry)) * rotation.transpose();
    let mut nodes: Vec<CubicNode> = (0..=sectors)
        .map(|i| {
            let angle = start_angle + i as f64 * step;
            let (sin, cos) = angle.sin_cos();
            let point = center + dvec2(cos, sin);
            let tangent = dvec2(-sin, cos) * handle;
            CubicNode {
                incoming: from_unit * (point - tangent),
                point: from_unit * point,
                outgoing: from_unit * (point + tangent),
            }
        })
        .collect();

    // pin the ends to the exact inputs
    if let Some(first) = nodes.first_mut() {
        first.point = start;
        first.incoming = start;
    }
    if let Some(last) = nodes.last_mut() {
        last.point = end;
        last.outgoing = end;
    }
    nodes
}
