//! Mesh readers feeding the solver: legacy VTK, VTK XML and Gmsh with
//! physical tags used to build boundary groups.

use std::io::Write;

use approx::assert_relative_eq;
use fv_rs::io::{FieldArray, FieldData, SnapshotFormat, SnapshotWriter};
use fv_rs::mesh::read_gmsh_mesh;
use fv_rs::{Godunov, LinearAdvection, Point2, Scalar, read_mesh};
use tempfile::{Builder, NamedTempFile, TempDir};

const CHANNEL_MSH: &str = r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
6
1 0 0 0
2 1 0 0
3 2 0 0
4 0 1 0
5 1 1 0
6 2 1 0
$EndNodes
$Elements
9
1 1 2 1 1 4 1
2 1 2 2 2 3 6
3 1 2 3 3 1 2
4 1 2 3 3 2 3
5 1 2 3 4 6 5
6 1 2 3 4 5 4
7 3 2 0 1 1 2 5 4
8 2 2 0 2 2 3 6
9 2 2 0 2 2 6 5
$EndElements
"#;

fn msh_file() -> NamedTempFile {
    Builder::new().suffix(".msh").tempfile().unwrap()
}

#[test]
fn test_gmsh_physical_tags_drive_groups() {
    let mut file = msh_file();
    file.write_all(CHANNEL_MSH.as_bytes()).unwrap();

    let gmsh = read_gmsh_mesh(file.path()).unwrap();
    let tags = gmsh.physical_tags.clone();
    let mut model = Godunov::<LinearAdvection>::from_mesh(gmsh.mesh, Point2::new(1.0, 0.0)).unwrap();

    let inflow = model
        .register_group("inflow", |w| tags.get(&w.index) == Some(&1))
        .unwrap();
    let outflow = model
        .register_group("outflow", |w| tags.get(&w.index) == Some(&2))
        .unwrap();
    let walls = model
        .register_group("walls", |w| tags.get(&w.index) == Some(&3))
        .unwrap();
    assert_eq!((inflow, outflow, walls), (1, 1, 4));

    model.set_inflow_state("inflow", Scalar::from(1.0)).unwrap();
    model.mark_outlet("outflow").unwrap();
    model.mark_solid("walls").unwrap();
    model.set_time_steps(0.1, 1, 1);
    model.step().unwrap();

    // Only the quad touching the inflow receives mass in the first step.
    assert_relative_eq!(model.states()[0].value(), 0.1, epsilon = 1e-12);
    assert_relative_eq!(model.states()[1].value(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(model.states()[2].value(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_gmsh_and_vtk_agree() {
    let mut msh = msh_file();
    msh.write_all(CHANNEL_MSH.as_bytes()).unwrap();
    let from_gmsh = read_mesh(msh.path()).unwrap();

    let dir = TempDir::new().unwrap();
    let vtk_path = dir.path().join("channel.vtk");
    SnapshotFormat::LegacyVtk
        .write_snapshot(&vtk_path, &from_gmsh, &FieldData::new())
        .unwrap();
    let from_vtk = read_mesh(&vtk_path).unwrap();

    assert_eq!(from_vtk.count_cells(), from_gmsh.count_cells());
    assert_eq!(from_vtk.count_walls(), from_gmsh.count_walls());
    assert_relative_eq!(from_vtk.total_measure(), from_gmsh.total_measure(), epsilon = 1e-12);
}

#[test]
fn test_vtu_snapshot_is_readable_mesh() {
    let tiny = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/tiny.vtk");
    let mesh = read_mesh(&tiny).unwrap();

    let mut fields = FieldData::new().with_time(0.25);
    fields.add_cell_field("level", FieldArray::Scalar(vec![1.0, 2.0, 3.0]));
    fields.add_point_field(
        "wind",
        FieldArray::Vector(vec![Point2::new(1.0, 0.0); mesh.count_nodes()]),
    );

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("0.vtu");
    SnapshotFormat::Vtu.write_snapshot(&path, &mesh, &fields).unwrap();

    let reread = read_mesh(&path).unwrap();
    assert_eq!(reread.count_nodes(), 6);
    assert_eq!(reread.count_cells(), 3);
    assert_eq!(reread.count_walls(), 8);
    assert_relative_eq!(reread.total_measure(), 2.0, epsilon = 1e-12);
}

#[test]
fn test_snapshot_rejects_wrong_field_length() {
    let tiny = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/tiny.vtk");
    let mesh = read_mesh(&tiny).unwrap();
    let mut fields = FieldData::new();
    fields.add_cell_field("level", FieldArray::Scalar(vec![1.0]));

    let dir = TempDir::new().unwrap();
    let result = SnapshotFormat::LegacyVtk.write_snapshot(&dir.path().join("bad.vtk"), &mesh, &fields);
    assert!(result.is_err());
}
