//! Strongly-typed identifiers shared across the crate.
//!
//! Arena indices are distinct from the integer ids a mesh file assigns to its
//! nodes and cells: ids are whatever the file says, indices are dense and
//! assigned in insertion order.

mod indices;

pub use indices::{CellIndex, NodeIndex, WallIndex};
