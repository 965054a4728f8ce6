//! Errors raised while setting up or running a finite-volume solver.

use std::path::PathBuf;

use thiserror::Error;

use super::config::ConfigError;
use crate::boundary::BoundaryError;
use crate::io::MeshIoError;
use crate::mesh::TopologyError;

/// Error type for [`Godunov`](super::Godunov).
#[derive(Debug, Error)]
pub enum GodunovError {
    #[error("failed to load mesh {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: MeshIoError,
    },

    #[error("boundary configuration: {0}")]
    Configuration(#[from] BoundaryError),

    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: MeshIoError,
    },

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("snapshot fields: {0}")]
    Fields(#[source] MeshIoError),

    #[error("state vector has {found} entries, mesh has {expected} cells")]
    StateLength { expected: usize, found: usize },
}
