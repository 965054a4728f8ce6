//! Planar geometry primitives used by the mesh.

mod point;

pub use point::{Point2, signed_area};
