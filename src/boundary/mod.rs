//! Boundary classification.
//!
//! Boundary walls (walls with exactly one adjacent cell) are collected into
//! named groups, each group is tagged with a [`BoundaryKind`](crate::mesh::BoundaryKind),
//! and pairs of groups can be stitched together as periodic boundaries.

mod error;
mod registry;

pub use error::BoundaryError;
pub use registry::{BoundaryGroup, BoundaryRegistry, BoundaryWall, PeriodicPair};
