//! Finite-volume solver.
//!
//! # Submodules
//!
//! - [`config`]: Run settings (duration, step count, output cadence), TOML loading
//! - [`diagnostics`]: Conservation and Courant-number diagnostics
//!
//! The engine itself is [`Godunov`], generic over a
//! [`RiemannSolver`](crate::riemann::RiemannSolver).

pub mod config;
pub mod diagnostics;
mod error;
mod godunov;

pub use config::{ConfigError, RunConfig};
pub use error::GodunovError;
pub use godunov::{Godunov, RunSummary};
