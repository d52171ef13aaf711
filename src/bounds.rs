//! Closed intervals and axis-aligned boxes used to accumulate drawing extents.
//!
//! An interval whose bounds are not finite is empty. [`BoundingInterval::EMPTY`]
//! is `(+inf, -inf)`, which is both the identity for union and the result of
//! intersecting disjoint intervals.

use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Mul, MulAssign, Neg};

use glam::dvec2;

use crate::types::Vector;

/// Below this magnitude a polynomial coefficient counts as zero.
pub const EXTREMA_TOLERANCE: f64 = 1e-9;

// ============================================================================
// BoundingInterval
// ============================================================================

/// A 1D closed interval `[minimum, maximum]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingInterval {
    pub minimum: f64,
    pub maximum: f64,
}

impl BoundingInterval {
    pub const EMPTY: Self = Self {
        minimum: f64::INFINITY,
        maximum: f64::NEG_INFINITY,
    };

    /// Interval spanning both values, in either order.
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            minimum: a.min(b),
            maximum: a.max(b),
        }
    }

    /// Degenerate interval holding a single value.
    pub fn point(value: f64) -> Self {
        Self {
            minimum: value,
            maximum: value,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.minimum.is_finite() && self.maximum.is_finite())
    }

    /// Smallest interval covering both.
    pub fn union(self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            minimum: self.minimum.min(other.minimum),
            maximum: self.maximum.max(other.maximum),
        }
    }

    /// Overlap of both intervals, [`EMPTY`](Self::EMPTY) when they are disjoint.
    pub fn intersection(self, other: Self) -> Self {
        let minimum = self.minimum.max(other.minimum);
        let maximum = self.maximum.min(other.maximum);
        if minimum > maximum || self.is_empty() || other.is_empty() {
            Self::EMPTY
        } else {
            Self { minimum, maximum }
        }
    }

    /// Scale both bounds. A negative factor swaps them so the interval stays ordered.
    pub fn scaled(self, factor: f64) -> Self {
        if self.is_empty() {
            return self;
        }
        Self::new(self.minimum * factor, self.maximum * factor)
    }

    /// Grow the interval to include `value`.
    pub fn expand(&mut self, value: f64) {
        *self = self.union(Self::point(value));
    }

    pub fn contains(&self, value: f64) -> bool {
        self.minimum <= value && value <= self.maximum
    }

    pub fn center(&self) -> f64 {
        self.minimum + (self.maximum - self.minimum) / 2.0
    }

    pub fn size(&self) -> f64 {
        self.maximum - self.minimum
    }
}

impl Default for BoundingInterval {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BitOr for BoundingInterval {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for BoundingInterval {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for BoundingInterval {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitAndAssign for BoundingInterval {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl Mul<f64> for BoundingInterval {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}

impl MulAssign<f64> for BoundingInterval {
    fn mul_assign(&mut self, rhs: f64) {
        *self = self.scaled(rhs);
    }
}

impl Neg for BoundingInterval {
    type Output = Self;
    fn neg(self) -> Self {
        if self.is_empty() {
            return self;
        }
        Self {
            minimum: -self.maximum,
            maximum: -self.minimum,
        }
    }
}

// ============================================================================
// BoundingBox
// ============================================================================

/// A 2D axis-aligned box, one interval per axis.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BoundingBox {
    pub x: BoundingInterval,
    pub y: BoundingInterval,
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        x: BoundingInterval::EMPTY,
        y: BoundingInterval::EMPTY,
    };

    pub fn new(x: BoundingInterval, y: BoundingInterval) -> Self {
        Self { x, y }
    }

    /// Box spanning two opposite corners.
    pub fn from_corners(a: Vector, b: Vector) -> Self {
        Self {
            x: BoundingInterval::new(a.x, b.x),
            y: BoundingInterval::new(a.y, b.y),
        }
    }

    pub fn from_point(p: Vector) -> Self {
        Self {
            x: BoundingInterval::point(p.x),
            y: BoundingInterval::point(p.y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            x: self.x | other.x,
            y: self.y | other.y,
        }
    }

    /// Overlap of both boxes; empty on both axes if either axis is disjoint.
    pub fn intersection(self, other: Self) -> Self {
        let x = self.x & other.x;
        let y = self.y & other.y;
        if x.is_empty() || y.is_empty() {
            Self::EMPTY
        } else {
            Self { x, y }
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Grow the box to include `p`.
    pub fn expand_point(&mut self, p: Vector) {
        self.x.expand(p.x);
        self.y.expand(p.y);
    }

    pub fn contains_point(&self, p: Vector) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    pub fn minimum(&self) -> Vector {
        dvec2(self.x.minimum, self.y.minimum)
    }

    pub fn maximum(&self) -> Vector {
        dvec2(self.x.maximum, self.y.maximum)
    }

    pub fn center(&self) -> Vector {
        dvec2(self.x.center(), self.y.center())
    }

    pub fn width(&self) -> f64 {
        self.x.size()
    }

    pub fn height(&self) -> f64 {
        self.y.size()
    }

    pub fn left(&self) -> f64 {
        self.x.minimum
    }

    pub fn right(&self) -> f64 {
        self.x.maximum
    }

    pub fn top(&self) -> f64 {
        self.y.minimum
    }

    pub fn bottom(&self) -> f64 {
        self.y.maximum
    }
}

impl BitOr for BoundingBox {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for BoundingBox {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for BoundingBox {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl BitAndAssign for BoundingBox {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl Mul<f64> for BoundingBox {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scaled(rhs)
    }
}

impl Neg for BoundingBox {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

// ============================================================================
// Curve extrema
// ============================================================================

/// Range of one coordinate of a cubic bezier over `t` in `[0, 1]`.
///
/// The interior extrema are the roots of the derivative, a quadratic in `t`.
/// Roots outside the open interval `(0, 1)` are ignored.
pub fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> (f64, f64) {
    let mut cmin = p0.min(p3);
    let mut cmax = p0.max(p3);
    let d1 = p1 - p0;
    let d2 = p2 - p1;
    let d3 = p3 - p2;

    let mut visit = |t: f64| {
        if t > 0.0 && t < 1.0 {
            let mt = 1.0 - t;
            let value = mt * mt * mt * p0
                + 3.0 * mt * mt * t * p1
                + 3.0 * mt * t * t * p2
                + t * t * t * p3;
            cmin = cmin.min(value);
            cmax = cmax.max(value);
        }
    };

    let denom = d1 - 2.0 * d2 + d3;
    if denom.abs() > EXTREMA_TOLERANCE {
        if d2 * d2 > d1 * d3 {
            let root = (d2 * d2 - d1 * d3).sqrt();
            visit((d1 - d2 + root) / denom);
            visit((d1 - d2 - root) / denom);
        }
    } else if (d2 - d1).abs() > EXTREMA_TOLERANCE {
        visit(-d1 / (2.0 * (d2 - d1)));
    }

    (cmin, cmax)
}

/// Range of one coordinate of a quadratic bezier over `t` in `[0, 1]`.
pub fn quadratic_extrema(p0: f64, p1: f64, p2: f64) -> (f64, f64) {
    let mut cmin = p0.min(p2);
    let mut cmax = p0.max(p2);
    let denom = p0 + p2 - 2.0 * p1;
    if denom.abs() > EXTREMA_TOLERANCE {
        let t = (p0 - p1) / denom;
        if t > 0.0 && t < 1.0 {
            let mt = 1.0 - t;
            let value = mt * mt * p0 + 2.0 * mt * t * p1 + t * t * p2;
            cmin = cmin.min(value);
            cmax = cmax.max(value);
        }
    }
    (cmin, cmax)
}
