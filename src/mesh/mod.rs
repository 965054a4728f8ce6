//! Mesh representation.
//!
//! Provides the unstructured 2D mesh used by the finite-volume solver:
//! - Node, wall and cell arenas with left/right wall adjacency
//! - Boundary kinds used to tag groups of boundary walls
//! - Gmsh mesh file input

mod boundary_tags;
mod error;
pub mod gmsh;
mod mesh2d;

pub use boundary_tags::BoundaryKind;
pub use error::TopologyError;
pub use gmsh::{GmshError, GmshMesh, read_gmsh_mesh};
pub use mesh2d::{Cell, CellShape, Mesh2D, Node, Side, Wall};
