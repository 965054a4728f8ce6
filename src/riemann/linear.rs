//! Exact Riemann solver for scalar linear advection.
//!
//! u_t + a · ∇u = 0
//!
//! Along a wall with unit normal n the problem reduces to
//! u_t + a_n u_x = 0 with a_n = a · n, whose Godunov flux is the upwind flux.

use super::state::Scalar;
use super::traits::RiemannSolver;
use crate::geometry::Point2;

/// Upwind flux for constant-velocity advection.
///
/// Coefficients are the advection velocity `(a_x, a_y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearAdvection {
    a_normal: f64,
}

impl LinearAdvection {
    /// Velocity component along the bound normal.
    pub fn normal_speed(&self) -> f64 {
        self.a_normal
    }
}

impl RiemannSolver for LinearAdvection {
    type State = Scalar;
    type Coefficients = Point2;

    fn bind(normal: Point2, velocity: &Point2) -> Self {
        Self {
            a_normal: velocity.dot(&normal),
        }
    }

    #[inline]
    fn flux_on_time_axis(&self, left: &Scalar, right: &Scalar) -> Scalar {
        if self.a_normal >= 0.0 {
            *left * self.a_normal
        } else {
            *right * self.a_normal
        }
    }

    fn name(&self) -> &'static str {
        "linear-advection"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_upwind_direction() {
        let a = Point2::new(2.0, 0.0);
        let u_l = Scalar::from(1.0);
        let u_r = Scalar::from(3.0);

        let forward = LinearAdvection::bind(Point2::new(1.0, 0.0), &a);
        assert_relative_eq!(forward.flux_on_time_axis(&u_l, &u_r).value(), 2.0);

        let backward = LinearAdvection::bind(Point2::new(-1.0, 0.0), &a);
        assert_relative_eq!(backward.flux_on_time_axis(&u_l, &u_r).value(), -6.0);
    }

    #[test]
    fn test_oblique_normal() {
        let a = Point2::new(1.0, 1.0);
        let n = Point2::new(1.0, 1.0) / 2.0_f64.sqrt();
        let solver = LinearAdvection::bind(n, &a);
        assert_relative_eq!(solver.normal_speed(), 2.0_f64.sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_tangential_velocity_gives_zero_flux() {
        let solver = LinearAdvection::bind(Point2::new(0.0, 1.0), &Point2::new(3.0, 0.0));
        let flux = solver.flux_on_time_axis(&Scalar::from(1.0), &Scalar::from(2.0));
        assert_relative_eq!(flux.value(), 0.0);
    }

    #[test]
    fn test_conservative_under_reversal() {
        let a = Point2::new(0.7, -0.3);
        let n = Point2::new(0.6, 0.8);
        let (u_l, u_r) = (Scalar::from(1.2), Scalar::from(-0.4));
        let f = LinearAdvection::bind(n, &a).flux_on_time_axis(&u_l, &u_r);
        let g = LinearAdvection::bind(-n, &a).flux_on_time_axis(&u_r, &u_l);
        assert_relative_eq!(f.value(), -g.value(), epsilon = 1e-14);
    }
}
