//! 2D points and vectors.
//!
//! A single `Point2` type serves both roles; differences of points are used as
//! vectors. Only the handful of operations the mesh needs are provided.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// A point (or displacement) in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The origin.
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Scalar (z-component of the) cross product `self × other`.
    #[inline]
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// Midpoint of the segment `self`–`other`.
    #[inline]
    pub fn midpoint(&self, other: &Self) -> Self {
        (*self + *other) * 0.5
    }

    /// Rotate by -90° (clockwise): `(x, y) -> (y, -x)`.
    #[inline]
    pub fn rotate_cw(&self) -> Self {
        Self::new(self.y, -self.x)
    }

    /// True if `self -> b -> c` turns clockwise.
    ///
    /// Collinear points are not clockwise.
    pub fn is_clockwise(&self, b: &Self, c: &Self) -> bool {
        (*b - *self).cross(&(*c - *self)) < 0.0
    }
}

impl Add for Point2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Self;
    #[inline]
    fn mul(self, c: f64) -> Self {
        Self::new(self.x * c, self.y * c)
    }
}

impl Div<f64> for Point2 {
    type Output = Self;
    #[inline]
    fn div(self, c: f64) -> Self {
        Self::new(self.x / c, self.y / c)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Signed area of a simple polygon (shoelace formula).
///
/// Positive for counter-clockwise vertex order.
pub fn signed_area(vertices: &[Point2]) -> f64 {
    let n = vertices.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        twice_area += vertices[i].cross(&vertices[(i + 1) % n]);
    }
    0.5 * twice_area
}
