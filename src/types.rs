//! Planar value types: points/vectors and directed line segments.
//!
//! Points and displacement vectors are both `glam::DVec2`. The extra
//! operations the path engine needs (tolerant comparison, polar form, the
//! scalar cross product) come from the [`VectorExt`] trait.

use glam::{DVec2, dvec2};

/// A point or displacement in the plane.
pub type Vector = DVec2;

/// Default relative tolerance for [`VectorExt::is_close`].
pub const VECTOR_RTOL: f64 = 1e-5;
/// Default absolute tolerance for [`VectorExt::is_close`].
pub const VECTOR_ATOL: f64 = 1e-8;

/// Geometry helpers on top of `DVec2`.
pub trait VectorExt: Sized {
    /// Create a vector from polar coordinates.
    ///
    /// A zero radius always yields the origin. A non-zero radius without a
    /// direction has no meaning and returns `None`.
    fn from_polar(radius: f64, theta: Option<f64>) -> Option<Self>;

    /// Z component of the cross product of the vectors extended into 3D.
    fn cross(self, other: Self) -> f64;

    /// Polar angle in radians, `None` for the zero vector.
    fn angle(self) -> Option<f64>;

    /// Magnitude and direction.
    fn to_polar(self) -> (f64, Option<f64>);

    /// `|self - other| < atol + rtol * |other|`
    fn is_close_with(self, other: Self, rtol: f64, atol: f64) -> bool;

    /// [`is_close_with`](Self::is_close_with) with the default tolerances.
    fn is_close(self, other: Self) -> bool {
        self.is_close_with(other, VECTOR_RTOL, VECTOR_ATOL)
    }
}

impl VectorExt for DVec2 {
    fn from_polar(radius: f64, theta: Option<f64>) -> Option<Self> {
        if radius == 0.0 {
            return Some(DVec2::ZERO);
        }
        theta.map(|theta| dvec2(radius * theta.cos(), radius * theta.sin()))
    }

    fn cross(self, other: Self) -> f64 {
        self.perp_dot(other)
    }

    fn angle(self) -> Option<f64> {
        if self.x == 0.0 && self.y == 0.0 {
            None
        } else {
            Some(self.y.atan2(self.x))
        }
    }

    fn to_polar(self) -> (f64, Option<f64>) {
        (self.length(), self.angle())
    }

    fn is_close_with(self, other: Self, rtol: f64, atol: f64) -> bool {
        (self - other).length() < atol + rtol * other.length()
    }
}

/// A directed line segment from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct DirectedLineSegment {
    pub start: Vector,
    pub end: Vector,
}

impl DirectedLineSegment {
    pub fn new(start: Vector, end: Vector) -> Self {
        Self { start, end }
    }

    /// Length and direction of the segment, without its position.
    pub fn vector(&self) -> Vector {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().length()
    }

    /// Angle of the segment in radians.
    pub fn angle(&self) -> f64 {
        let v = self.vector();
        v.y.atan2(v.x)
    }

    pub fn dot(&self, other: &DirectedLineSegment) -> f64 {
        self.vector().dot(other.vector())
    }

    /// Distance from `point` to the closest point of the segment.
    pub fn distance_to_point(&self, point: Vector) -> f64 {
        let to_point = DirectedLineSegment::new(self.start, point);
        let along = to_point.dot(self);
        if along <= 0.0 {
            return point.distance(self.start);
        }
        if self.dot(self) <= along {
            return point.distance(self.end);
        }
        self.perp_distance(point).unwrap_or(0.0)
    }

    /// Distance from `point` to the infinite line through the segment.
    ///
    /// `None` for a zero-length segment, which has no direction.
    pub fn perp_distance(&self, point: Vector) -> Option<f64> {
        let length = self.length();
        if length == 0.0 {
            return None;
        }
        let v = self.vector();
        Some((v.x * (self.start.y - point.y) - (self.start.x - point.x) * v.y).abs() / length)
    }

    /// Point at `ratio` along the segment (0 is `start`, 1 is `end`).
    pub fn point_at_ratio(&self, ratio: f64) -> Vector {
        self.start + self.vector() * ratio
    }

    /// Point at the given distance from `start`.
    pub fn point_at_length(&self, length: f64) -> Vector {
        self.point_at_ratio(length / self.length())
    }

    /// Segment with the reversed vector, ending at `point`.
    pub fn parallel(&self, point: Vector) -> DirectedLineSegment {
        DirectedLineSegment::new(point + self.vector(), point)
    }

    /// Intersection of the two lines, `None` when they are parallel.
    pub fn intersect(&self, other: &DirectedLineSegment) -> Option<Vector> {
        let denom = self.vector().cross(other.vector());
        if denom == 0.0 {
            return None;
        }
        let num = other.vector().cross(self.start - other.start);
        Some(self.point_at_ratio(num / denom))
    }
}
