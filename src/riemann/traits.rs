//! Riemann solver abstraction.
//!
//! A solver is bound once per wall to the wall's unit normal and to the
//! system coefficients. After binding it is a pure function of the two
//! adjacent states.
//!
//! # Example
//! ```
//! use fv_rs::geometry::Point2;
//! use fv_rs::riemann::{LinearAdvection, RiemannSolver, Scalar};
//!
//! let velocity = Point2::new(1.0, 0.0);
//! let solver = LinearAdvection::bind(Point2::new(1.0, 0.0), &velocity);
//! let flux = solver.flux_on_time_axis(&Scalar::from(2.0), &Scalar::from(5.0));
//! assert_eq!(flux.value(), 2.0);
//! ```

use std::fmt::Debug;

use super::state::StateVector;
use crate::geometry::Point2;
use crate::io::{FieldValue, OutputField};

/// Numerical flux across a wall, bound to the wall's unit normal.
///
/// # Implementation Notes
///
/// - `flux_on_time_axis(u, u)` must equal the physical normal flux of `u`
/// - Binding to `-n` and swapping the states must negate the flux
/// - `flux_on_time_axis` should not allocate
pub trait RiemannSolver: Clone + Debug + Send + Sync {
    /// Conserved variables, also used for fluxes.
    type State: StateVector;

    /// System coefficients shared by every wall (velocities, gas constants).
    type Coefficients: Clone + Debug + Send + Sync;

    /// Bind to a unit normal pointing from the left state to the right state.
    fn bind(normal: Point2, coefficients: &Self::Coefficients) -> Self;

    /// Godunov flux through the wall, per unit length, along the bound normal.
    fn flux_on_time_axis(&self, left: &Self::State, right: &Self::State) -> Self::State;

    /// Ghost state across a solid wall.
    ///
    /// Defaults to the negated interior state.
    fn solid_ghost(&self, inner: &Self::State) -> Self::State {
        -*inner
    }

    /// Named fields written to snapshots for one cell state.
    ///
    /// Defaults to one scalar per component: `u` for a single component,
    /// `u0`, `u1`, ... otherwise.
    fn output_fields(_coefficients: &Self::Coefficients, state: &Self::State) -> Vec<OutputField> {
        let components = state.components();
        if components.len() == 1 {
            return vec![OutputField::new("u", FieldValue::Scalar(components[0]))];
        }
        components
            .iter()
            .enumerate()
            .map(|(i, &v)| OutputField::new(format!("u{}", i), FieldValue::Scalar(v)))
            .collect()
    }

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;
}
