//! # fv-rs
//!
//! A Godunov finite-volume library for hyperbolic conservation laws on
//! unstructured 2D meshes.
//!
//! This crate provides:
//! - Mixed triangle/quadrilateral meshes with oriented walls
//! - Named boundary groups, boundary kinds and periodic stitching
//! - Riemann solvers (linear advection, Burgers, Euler HLLC)
//! - A first-order Godunov engine with forward Euler time stepping
//! - VTK (`.vtk`, `.vtu`) and Gmsh (`.msh`) mesh input, VTK snapshot output
//!
//! # Example
//!
//! ```no_run
//! use fv_rs::{Euler, Godunov, IdealGas, Primitive};
//!
//! let gas = IdealGas::default();
//! let mut model = Godunov::<Euler>::load("tube.vtk", gas)?;
//! model.register_group("ends", |w| w.center.x < 1e-9 || w.center.x > 1.0 - 1e-9)?;
//! model.register_group("sides", |w| w.center.x > 1e-9 && w.center.x < 1.0 - 1e-9)?;
//! model.mark_free("ends")?;
//! model.mark_solid("sides")?;
//! model.set_initial_state(|c| {
//!     if c.x < 0.5 {
//!         gas.conserved(Primitive::new(1.0, 0.0, 0.0, 1.0))
//!     } else {
//!         gas.conserved(Primitive::new(0.125, 0.0, 0.0, 0.1))
//!     }
//! });
//! model.set_time_steps(0.2, 400, 40);
//! model.run()?;
//! # Ok::<(), fv_rs::GodunovError>(())
//! ```

pub mod boundary;
pub mod geometry;
pub mod io;
pub mod mesh;
pub mod riemann;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use boundary::{BoundaryError, BoundaryGroup, BoundaryRegistry, BoundaryWall, PeriodicPair};
pub use geometry::Point2;
pub use mesh::{BoundaryKind, Cell, CellShape, Mesh2D, Side, TopologyError, Wall};
pub use types::{CellIndex, NodeIndex, WallIndex};

// Riemann solvers
pub use riemann::{
    Burgers, Conserved, Euler, EulerState, IdealGas, LinearAdvection, Primitive, RiemannSolver,
    Scalar, StateVector,
};

// Solver
pub use solver::{ConfigError, Godunov, GodunovError, RunConfig, RunSummary};
pub use time::{ForwardEuler, TimeIntegrator};

// I/O types
pub use io::{
    FieldData, FieldValue, MeshFormat, MeshIoError, OutputField, SnapshotFormat, SnapshotWriter,
    read_mesh,
};
