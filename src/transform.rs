//! 2x3 affine transforms in SVG hexad order.
//!
//! ```text
//! [ a c e ]     x' = a*x + c*y + e
//! [ b d f ]     y' = b*x + d*y + f
//! ```
//!
//! Composition follows the SVG convention: `t1.compose(t2)` (or `t1 * t2`) is
//! the matrix product, so `t2` acts on a point first.

use std::fmt;
use std::ops::{Mul, MulAssign};
use std::str::FromStr;

use glam::dvec2;

use crate::bounds::BoundingBox;
use crate::errors::{GeometryError, ParseError};
use crate::format::FormatOptions;
use crate::types::Vector;

/// How a transform is written out in its shortest form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Translate,
    Scale,
    Rotate,
    Matrix,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// Tolerance for classification and [`approx_eq`](Self::approx_eq).
    pub const ABSOLUTE_TOLERANCE: f64 = 1e-5;

    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn from_hexad(h: [f64; 6]) -> Self {
        Self::new(h[0], h[1], h[2], h[3], h[4], h[5])
    }

    pub const fn to_hexad(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    // ------------------------------------------------------------------------
    // Constructors for the primitive operations
    // ------------------------------------------------------------------------

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(s: f64) -> Self {
        Self::scale_xy(s, s)
    }

    pub fn scale_xy(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counter-clockwise rotation in degrees (clockwise on screen, y down).
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Rotation about `center` rather than the origin.
    pub fn rotate_about(degrees: f64, center: Vector) -> Self {
        Self::translate(center.x, center.y)
            * Self::rotate(degrees)
            * Self::translate(-center.x, -center.y)
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    // ------------------------------------------------------------------------
    // Algebra
    // ------------------------------------------------------------------------

    /// Matrix product `self * other`: `other` is applied to points first.
    pub fn compose(&self, other: &Transform) -> Transform {
        let (s, o) = (self, other);
        Transform {
            a: s.a * o.a + s.c * o.b,
            b: s.b * o.a + s.d * o.b,
            c: s.a * o.c + s.c * o.d,
            d: s.b * o.c + s.d * o.d,
            e: s.a * o.e + s.c * o.f + s.e,
            f: s.b * o.e + s.d * o.f + s.f,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.c * self.b
    }

    /// Exact matrix inverse.
    pub fn invert(&self) -> Result<Transform, GeometryError> {
        let det = self.determinant();
        if det == 0.0 {
            return Err(GeometryError::SingularMatrix { determinant: det });
        }
        let a = self.d / det;
        let d = self.a / det;
        let c = -self.c / det;
        let b = -self.b / det;
        Ok(Transform {
            a,
            b,
            c,
            d,
            e: -(a * self.e + c * self.f),
            f: -(b * self.e + d * self.f),
        })
    }

    pub fn apply_to_point(&self, p: Vector) -> Vector {
        dvec2(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Box around the four transformed corners of `bbox`.
    pub fn apply_to_bbox(&self, bbox: &BoundingBox) -> BoundingBox {
        if bbox.is_empty() {
            return *bbox;
        }
        let corners = [
            dvec2(bbox.left(), bbox.top()),
            dvec2(bbox.right(), bbox.top()),
            dvec2(bbox.left(), bbox.bottom()),
            dvec2(bbox.right(), bbox.bottom()),
        ];
        let mut out = BoundingBox::EMPTY;
        for corner in corners {
            out.expand_point(self.apply_to_point(corner));
        }
        out
    }

    /// Coefficient-wise linear blend, `fraction` 0 is `self` and 1 is `other`.
    ///
    /// Intermediate rotations are not rotations: blending `rotate(0)` and
    /// `rotate(90)` at 0.5 shrinks the shape.
    pub fn interpolate(&self, other: &Transform, fraction: f64) -> Transform {
        let lerp = |from: f64, to: f64| from + (to - from) * fraction;
        Transform {
            a: lerp(self.a, other.a),
            b: lerp(self.b, other.b),
            c: lerp(self.c, other.c),
            d: lerp(self.d, other.d),
            e: lerp(self.e, other.e),
            f: lerp(self.f, other.f),
        }
    }

    // ------------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------------

    fn tolerance(exact: bool) -> f64 {
        if exact { 0.0 } else { Self::ABSOLUTE_TOLERANCE }
    }

    /// Every coefficient within the absolute tolerance of `other`'s.
    pub fn approx_eq(&self, other: &Transform) -> bool {
        self.to_hexad()
            .iter()
            .zip(other.to_hexad())
            .all(|(l, r)| (l - r).abs() <= Self::ABSOLUTE_TOLERANCE)
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY)
    }

    /// Only a translation.
    pub fn is_translate(&self, exact: bool) -> bool {
        let tol = Self::tolerance(exact);
        (self.a - 1.0).abs() <= tol
            && (self.d - 1.0).abs() <= tol
            && self.b.abs() <= tol
            && self.c.abs() <= tol
    }

    /// Only a scale about the origin.
    pub fn is_scale(&self, exact: bool) -> bool {
        let tol = Self::tolerance(exact);
        self.e.abs() <= tol && self.f.abs() <= tol && self.b.abs() <= tol && self.c.abs() <= tol
    }

    /// Only a rotation about the origin.
    pub fn is_rotate(&self, exact: bool) -> bool {
        let tol = Self::tolerance(exact);
        self.is_uniform_rotation(tol)
            && self.e.abs() <= tol
            && self.f.abs() <= tol
            && (self.a * self.a + self.b * self.b - 1.0).abs() <= tol
    }

    // uniform scale x rotation x translation
    fn is_uniform_rotation(&self, tol: f64) -> bool {
        (self.a - self.d).abs() <= tol && (self.b + self.c).abs() <= tol
    }

    pub fn classify(&self, exact: bool) -> TransformKind {
        if self.is_translate(exact) {
            TransformKind::Translate
        } else if self.is_scale(exact) {
            TransformKind::Scale
        } else if self.is_rotate(exact) {
            TransformKind::Rotate
        } else {
            TransformKind::Matrix
        }
    }

    /// Rotation angle in degrees, for matrices free of shear and non-uniform scale.
    pub fn rotation_degrees(&self) -> Result<f64, GeometryError> {
        if !self.is_uniform_rotation(Self::ABSOLUTE_TOLERANCE) {
            return Err(GeometryError::UndefinedRotation);
        }
        Ok(self.b.atan2(self.a).to_degrees())
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Shortest SVG form; the identity serializes as an empty string.
    pub fn to_string_with(&self, opts: &FormatOptions) -> String {
        match self.classify(false) {
            TransformKind::Translate if self.is_identity() => String::new(),
            TransformKind::Translate => {
                format!("translate({}, {})", opts.num(self.e), opts.num(self.f))
            }
            TransformKind::Scale => format!("scale({}, {})", opts.num(self.a), opts.num(self.d)),
            TransformKind::Rotate => match self.rotation_degrees() {
                Ok(degrees) => format!("rotate({})", opts.num(degrees)),
                Err(_) => self.matrix_string(opts),
            },
            TransformKind::Matrix => self.matrix_string(opts),
        }
    }

    fn matrix_string(&self, opts: &FormatOptions) -> String {
        let values: Vec<String> = self.to_hexad().iter().map(|v| opts.num(*v)).collect();
        format!("matrix({})", values.join(" "))
    }
}

impl Mul for Transform {
    type Output = Transform;
    fn mul(self, rhs: Transform) -> Transform {
        self.compose(&rhs)
    }
}

impl MulAssign for Transform {
    fn mul_assign(&mut self, rhs: Transform) {
        *self = self.compose(&rhs);
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&FormatOptions::default()))
    }
}

impl FromStr for Transform {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse_transform(s)
    }
}
