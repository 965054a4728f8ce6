//! Fixed-size conserved-variable vectors.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

/// Vector-space operations a cell state must support.
///
/// Fluxes and time derivatives share the state type.
pub trait StateVector:
    Copy
    + Default
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
    + AddAssign
    + SubAssign
{
    /// Raw components.
    fn components(&self) -> &[f64];

    fn components_mut(&mut self) -> &mut [f64];

    /// Largest absolute component.
    fn max_abs(&self) -> f64 {
        self.components().iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    /// All components finite.
    fn is_finite(&self) -> bool {
        self.components().iter().all(|v| v.is_finite())
    }
}

/// `N` conserved quantities stored inline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conserved<const N: usize>(pub [f64; N]);

/// Single conserved scalar.
pub type Scalar = Conserved<1>;

impl<const N: usize> Conserved<N> {
    #[inline]
    pub const fn new(values: [f64; N]) -> Self {
        Self(values)
    }

    #[inline]
    pub const fn zero() -> Self {
        Self([0.0; N])
    }

    /// Same value in every component.
    pub fn splat(value: f64) -> Self {
        Self([value; N])
    }

    pub fn as_array(&self) -> &[f64; N] {
        &self.0
    }
}

impl Conserved<1> {
    /// The single component.
    #[inline]
    pub fn value(&self) -> f64 {
        self.0[0]
    }
}

impl<const N: usize> Default for Conserved<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> From<[f64; N]> for Conserved<N> {
    fn from(values: [f64; N]) -> Self {
        Self(values)
    }
}

impl From<f64> for Conserved<1> {
    fn from(value: f64) -> Self {
        Self([value])
    }
}

impl<const N: usize> Index<usize> for Conserved<N> {
    type Output = f64;
    #[inline]
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl<const N: usize> IndexMut<usize> for Conserved<N> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl<const N: usize> Add for Conserved<N> {
    type Output = Self;
    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<const N: usize> AddAssign for Conserved<N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl<const N: usize> Sub for Conserved<N> {
    type Output = Self;
    #[inline]
    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<const N: usize> SubAssign for Conserved<N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
    }
}

impl<const N: usize> Neg for Conserved<N> {
    type Output = Self;
    #[inline]
    fn neg(mut self) -> Self {
        for a in self.0.iter_mut() {
            *a = -*a;
        }
        self
    }
}

impl<const N: usize> Mul<f64> for Conserved<N> {
    type Output = Self;
    #[inline]
    fn mul(mut self, s: f64) -> Self {
        self *= s;
        self
    }
}

impl<const N: usize> MulAssign<f64> for Conserved<N> {
    #[inline]
    fn mul_assign(&mut self, s: f64) {
        for a in self.0.iter_mut() {
            *a *= s;
        }
    }
}

impl<const N: usize> Div<f64> for Conserved<N> {
    type Output = Self;
    #[inline]
    fn div(mut self, s: f64) -> Self {
        self /= s;
        self
    }
}

impl<const N: usize> DivAssign<f64> for Conserved<N> {
    #[inline]
    fn div_assign(&mut self, s: f64) {
        for a in self.0.iter_mut() {
            *a /= s;
        }
    }
}

impl<const N: usize> StateVector for Conserved<N> {
    fn components(&self) -> &[f64] {
        &self.0
    }

    fn components_mut(&mut self) -> &mut [f64] {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Conserved::new([1.0, 2.0, 3.0]);
        let b = Conserved::new([0.5, 0.5, 0.5]);
        assert_eq!(a + b, Conserved::new([1.5, 2.5, 3.5]));
        assert_eq!(a - b, Conserved::new([0.5, 1.5, 2.5]));
        assert_eq!(-a, Conserved::new([-1.0, -2.0, -3.0]));
        assert_eq!(a * 2.0, Conserved::new([2.0, 4.0, 6.0]));
        assert_eq!(a / 2.0, Conserved::new([0.5, 1.0, 1.5]));
    }

    #[test]
    fn test_default_is_zero() {
        let z: Conserved<4> = Default::default();
        assert_eq!(z, Conserved::zero());
        assert_eq!(z.max_abs(), 0.0);
    }

    #[test]
    fn test_scalar_helpers() {
        let s: Scalar = 3.5.into();
        assert_eq!(s.value(), 3.5);
        assert_eq!(s[0], 3.5);
    }

    #[test]
    fn test_max_abs_and_finite() {
        let a = Conserved::new([1.0, -4.0]);
        assert_eq!(a.max_abs(), 4.0);
        assert!(a.is_finite());
        assert!(!Conserved::new([f64::NAN, 0.0]).is_finite());
    }
}
