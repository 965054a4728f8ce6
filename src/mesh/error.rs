//! Topology errors raised while building or checking a mesh.

use thiserror::Error;

use super::mesh2d::Side;

/// Error type for malformed mesh topology.
///
/// Ids in the variants are the file-assigned ids, not arena indices.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    #[error("node {0} is referenced but was never defined")]
    UnknownNode(usize),

    #[error("node {0} is defined twice")]
    DuplicateNode(usize),

    #[error("wall between nodes {head} and {tail} is defined twice")]
    DuplicateWall { head: usize, tail: usize },

    #[error("wall id {0} is used twice")]
    DuplicateWallId(usize),

    #[error("wall starts and ends at node {0}")]
    DegenerateWall(usize),

    #[error("cell {cell} visits node {node} more than once")]
    RepeatedNode { cell: usize, node: usize },

    #[error("cell {0} is defined twice")]
    DuplicateCell(usize),

    #[error("cell {cell} has {n_nodes} nodes; only triangles and quadrilaterals are supported")]
    UnsupportedShape { cell: usize, n_nodes: usize },

    #[error("cell {cell} has non-positive area {area:e}")]
    DegenerateCell { cell: usize, area: f64 },

    #[error("wall {wall} already has cell {existing} on its {side:?} side; cannot link cell {incoming}")]
    SideOccupied {
        wall: usize,
        side: Side,
        existing: usize,
        incoming: usize,
    },

    #[error("wall {0} has no adjacent cell on either side")]
    OrphanWall(usize),
}
