//! Exact Riemann solver for the scalar inviscid Burgers equation.
//!
//! u_t + ∇ · (a u² / 2) = 0
//!
//! Along a wall the normal flux is f(u) = k u² / 2 with k = a · n. The
//! Godunov flux is the minimum of f over [u_l, u_r] when u_l <= u_r and the
//! maximum of f over [u_r, u_l] otherwise.

use super::state::Scalar;
use super::traits::RiemannSolver;
use crate::geometry::Point2;

/// Godunov flux for the Burgers equation.
///
/// Coefficients are the direction vector `(a_x, a_y)` of the flux.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Burgers {
    k: f64,
}

impl Burgers {
    #[inline]
    fn physical(&self, u: f64) -> f64 {
        0.5 * self.k * u * u
    }

    /// Normal flux of a single state.
    pub fn flux(&self, u: &Scalar) -> Scalar {
        Scalar::from(self.physical(u.value()))
    }
}

impl RiemannSolver for Burgers {
    type State = Scalar;
    type Coefficients = Point2;

    fn bind(normal: Point2, direction: &Point2) -> Self {
        Self {
            k: direction.dot(&normal),
        }
    }

    fn flux_on_time_axis(&self, left: &Scalar, right: &Scalar) -> Scalar {
        let (u_l, u_r) = (left.value(), right.value());
        let (f_l, f_r) = (self.physical(u_l), self.physical(u_r));
        let flux = if u_l <= u_r {
            // Rarefaction for k > 0, shock for k < 0.
            if self.k >= 0.0 {
                self.physical(0.0_f64.max(u_l).min(u_r))
            } else {
                f_l.min(f_r)
            }
        } else if self.k >= 0.0 {
            f_l.max(f_r)
        } else {
            self.physical(0.0_f64.max(u_r).min(u_l))
        };
        Scalar::from(flux)
    }

    fn name(&self) -> &'static str {
        "burgers"
    }
}
