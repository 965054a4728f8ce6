//! Riemann solvers.
//!
//! Each solver implements [`RiemannSolver`]: it is bound to a wall's unit
//! normal and the system coefficients once, then maps a pair of adjacent
//! states to the Godunov flux through the wall.
//!
//! - [`LinearAdvection`]: exact upwind flux for scalar advection
//! - [`Burgers`]: exact flux for the inviscid Burgers equation
//! - [`Euler`]: HLLC flux for the 2D Euler equations of an ideal gas

mod burgers;
mod euler;
mod linear;
mod state;
mod traits;

pub use burgers::Burgers;
pub use euler::{Euler, EulerState, IdealGas, Primitive, max_wave_speed};
pub use linear::LinearAdvection;
pub use state::{Conserved, Scalar, StateVector};
pub use traits::RiemannSolver;
