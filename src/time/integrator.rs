//! Trait-based time integrator abstraction.
//!
//! The finite-volume engine computes the time derivative of every cell state
//! itself and hands it to an integrator through the narrow
//! [`TimeIntegrator::advance`] interface.
//!
//! # Example
//! ```
//! use fv_rs::riemann::Scalar;
//! use fv_rs::time::{ForwardEuler, TimeIntegrator};
//!
//! let mut u = vec![Scalar::from(1.0), Scalar::from(2.0)];
//! let du_dt = vec![Scalar::from(-1.0), Scalar::from(0.5)];
//! ForwardEuler.advance(&mut u, &du_dt, 0.1);
//! assert!((u[0].value() - 0.9).abs() < 1e-15);
//! ```

use crate::riemann::StateVector;

// =============================================================================
// Integrable Trait
// =============================================================================

/// Trait for solution types that can be time-integrated.
///
/// This provides the vector space operations needed by explicit time integrators:
/// - `scale`: Multiply by scalar (x <- c * x)
/// - `axpy`: Add scaled vector (x <- x + c * y)
pub trait Integrable: Clone + Send + Sized {
    /// Scale the solution by a constant: self <- c * self
    fn scale(&mut self, c: f64);

    /// Add a scaled vector: self <- self + c * other
    fn axpy(&mut self, c: f64, other: &Self);
}

/// Per-cell states stored contiguously.
impl<S: StateVector> Integrable for Vec<S> {
    fn scale(&mut self, c: f64) {
        for s in self.iter_mut() {
            *s = *s * c;
        }
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        for (s, o) in self.iter_mut().zip(other) {
            *s += *o * c;
        }
    }
}

// =============================================================================
// IntegratorInfo Trait (non-generic, dyn-compatible)
// =============================================================================

/// Non-generic information about a time integrator.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy of the integrator.
    fn order(&self) -> usize;
}

// =============================================================================
// TimeIntegrator Trait
// =============================================================================

/// Explicit single-stage time advancement.
///
/// `derivative` is computed from the state at the start of the step, so
/// every cell sees the same generation of neighbour states.
pub trait TimeIntegrator<S: Integrable>: IntegratorInfo {
    /// Advance `state` by `dt` given its time derivative.
    fn advance(&self, state: &mut S, derivative: &S, dt: f64);
}

// =============================================================================
// Forward Euler
// =============================================================================

/// Forward Euler integrator (1st order).
///
/// ```text
/// u_new = u + dt * du/dt
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl IntegratorInfo for ForwardEuler {
    fn name(&self) -> &'static str {
        "forward-euler"
    }

    fn order(&self) -> usize {
        1
    }
}

impl<S: Integrable> TimeIntegrator<S> for ForwardEuler {
    #[inline]
    fn advance(&self, state: &mut S, derivative: &S, dt: f64) {
        state.axpy(dt, derivative);
    }
}
