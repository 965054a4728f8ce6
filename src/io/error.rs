//! Mesh and snapshot I/O errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::mesh::{GmshError, TopologyError};

/// Error type for reading meshes and writing snapshots.
#[derive(Debug, Error)]
pub enum MeshIoError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed file content.
    #[error("parse error: {0}")]
    Parse(String),

    /// File extension with no reader or writer.
    #[error("unknown extension: {}", .0.display())]
    UnsupportedExtension(PathBuf),

    /// Recognised format with unsupported content (binary data, other dataset types).
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Cells in the file do not form a valid mesh.
    #[error("invalid topology: {0}")]
    Topology(#[from] TopologyError),

    #[error("gmsh: {0}")]
    Gmsh(#[from] GmshError),

    /// Field array does not match the entity count.
    #[error("field '{name}' has {found} values, expected {expected}")]
    FieldLength {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Cells reported different field layouts.
    #[error("inconsistent output fields: {0}")]
    InconsistentFields(String),
}
