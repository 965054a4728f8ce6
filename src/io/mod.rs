//! Mesh input and snapshot output.
//!
//! This module provides:
//! - **Readers**: legacy VTK (`.vtk`), VTK XML (`.vtu`) and Gmsh 2.2 (`.msh`)
//!   files become a [`Mesh2D`]
//! - **Writers**: a mesh plus named point/cell fields is written as `.vtk` or `.vtu`
//! - **Field data**: [`FieldData`], [`OutputField`] and [`FieldValue`] carry the
//!   values a solver wants to visualise
//!
//! Readers and writers are selected from the file extension through
//! [`MeshFormat`] and [`SnapshotFormat`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use fv_rs::io::{read_mesh, FieldData, SnapshotFormat, SnapshotWriter};
//!
//! let mesh = read_mesh(Path::new("channel.vtk"))?;
//! SnapshotFormat::Vtu.write_snapshot(Path::new("out/0.vtu"), &mesh, &FieldData::new())?;
//! # Ok::<(), fv_rs::io::MeshIoError>(())
//! ```

mod error;
mod fields;
mod vtk;
mod vtu;

use std::path::Path;

pub use error::MeshIoError;
pub use fields::{FieldArray, FieldData, FieldValue, OutputField};
pub use vtk::{read_vtk_mesh, write_vtk_snapshot};
pub use vtu::{read_vtu_mesh, write_vtu_snapshot};

use crate::mesh::{Mesh2D, read_gmsh_mesh};

/// Produces a mesh from a file.
pub trait MeshReader {
    fn read_mesh(&self, path: &Path) -> Result<Mesh2D, MeshIoError>;
}

/// Serializes a mesh and per-entity fields to a file.
pub trait SnapshotWriter {
    /// File extension, without the dot.
    fn extension(&self) -> &'static str;

    fn write_snapshot(&self, path: &Path, mesh: &Mesh2D, fields: &FieldData) -> Result<(), MeshIoError>;
}

/// Built-in mesh file formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshFormat {
    LegacyVtk,
    Vtu,
    Gmsh,
}

impl MeshFormat {
    /// Pick a format from the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Self, MeshIoError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("vtk") => Ok(MeshFormat::LegacyVtk),
            Some("vtu") => Ok(MeshFormat::Vtu),
            Some("msh") => Ok(MeshFormat::Gmsh),
            _ => Err(MeshIoError::UnsupportedExtension(path.to_path_buf())),
        }
    }
}

impl MeshReader for MeshFormat {
    fn read_mesh(&self, path: &Path) -> Result<Mesh2D, MeshIoError> {
        match self {
            MeshFormat::LegacyVtk => read_vtk_mesh(path),
            MeshFormat::Vtu => read_vtu_mesh(path),
            MeshFormat::Gmsh => Ok(read_gmsh_mesh(path)?.mesh),
        }
    }
}

/// Read a mesh, choosing the reader from the file extension.
pub fn read_mesh(path: &Path) -> Result<Mesh2D, MeshIoError> {
    let format = MeshFormat::from_path(path)?;
    let mesh = format.read_mesh(path)?;
    log::info!(
        "read {} ({} nodes, {} walls, {} cells)",
        path.display(),
        mesh.count_nodes(),
        mesh.count_walls(),
        mesh.count_cells()
    );
    Ok(mesh)
}

/// Built-in snapshot formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Legacy ASCII VTK (default)
    #[default]
    LegacyVtk,
    /// VTK XML unstructured grid
    Vtu,
}

impl SnapshotFormat {
    /// Pick a format from an extension such as `"vtk"` or `".vtu"`.
    pub fn from_extension(extension: &str) -> Result<Self, MeshIoError> {
        match extension.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "vtk" => Ok(SnapshotFormat::LegacyVtk),
            "vtu" => Ok(SnapshotFormat::Vtu),
            _ => Err(MeshIoError::UnsupportedExtension(extension.into())),
        }
    }
}

impl SnapshotWriter for SnapshotFormat {
    fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::LegacyVtk => "vtk",
            SnapshotFormat::Vtu => "vtu",
        }
    }

    fn write_snapshot(&self, path: &Path, mesh: &Mesh2D, fields: &FieldData) -> Result<(), MeshIoError> {
        match self {
            SnapshotFormat::LegacyVtk => write_vtk_snapshot(path, mesh, fields),
            SnapshotFormat::Vtu => write_vtu_snapshot(path, mesh, fields),
        }
    }
}
