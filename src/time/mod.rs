//! Time integration.

mod integrator;

pub use integrator::{ForwardEuler, Integrable, IntegratorInfo, TimeIntegrator};
