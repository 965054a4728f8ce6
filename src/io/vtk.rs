//! Legacy VTK (`.vtk`) unstructured-grid input and output.
//!
//! Only the ASCII flavour is supported. On input, triangles (cell type 5)
//! and quadrilaterals (cell type 9) become mesh cells; any other cell type
//! is skipped. Node ids are the point positions in the file, cell ids the
//! cell positions.
//!
//! ```text
//! # vtk DataFile Version 3.0
//! title
//! ASCII
//! DATASET UNSTRUCTURED_GRID
//! POINTS 4 double
//! 0 0 0  1 0 0  1 1 0  0 1 0
//! CELLS 1 5
//! 4 0 1 2 3
//! CELL_TYPES 1
//! 9
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use super::error::MeshIoError;
use super::fields::{FieldArray, FieldData, sanitize_name};
use crate::mesh::{CellShape, Mesh2D};

const VTK_TRIANGLE: u8 = 5;
const VTK_QUAD: u8 = 9;

pub(crate) fn vtk_cell_type(shape: CellShape) -> u8 {
    match shape {
        CellShape::Triangle => VTK_TRIANGLE,
        CellShape::Quadrilateral => VTK_QUAD,
    }
}

/// Expected node count for a supported VTK cell type.
pub(crate) fn supported_cell_nodes(cell_type: u8) -> Option<usize> {
    match cell_type {
        VTK_TRIANGLE => Some(3),
        VTK_QUAD => Some(4),
        _ => None,
    }
}

/// Read a legacy ASCII VTK unstructured grid.
pub fn read_vtk_mesh(path: &Path) -> Result<Mesh2D, MeshIoError> {
    let content = fs::read_to_string(path)?;
    parse_vtk(&content)
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str, MeshIoError> {
        self.inner
            .next()
            .ok_or_else(|| MeshIoError::Parse(format!("unexpected end of file reading {}", what)))
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> Result<T, MeshIoError> {
        let token = self.next(what)?;
        token
            .parse()
            .map_err(|_| MeshIoError::Parse(format!("invalid {}: '{}'", what, token)))
    }

    fn skip(&mut self, n: usize, what: &str) -> Result<(), MeshIoError> {
        for _ in 0..n {
            self.next(what)?;
        }
        Ok(())
    }
}

pub(crate) fn parse_vtk(content: &str) -> Result<Mesh2D, MeshIoError> {
    let mut parts = content.splitn(4, '\n');
    let header = parts.next().unwrap_or_default();
    if !header.trim_start().starts_with("# vtk DataFile") {
        return Err(MeshIoError::Parse("missing '# vtk DataFile' header".to_string()));
    }
    let _title = parts.next();
    let format = parts.next().unwrap_or_default().trim();
    if !format.eq_ignore_ascii_case("ASCII") {
        return Err(MeshIoError::UnsupportedFormat(format!(
            "legacy VTK data must be ASCII, found '{}'",
            format
        )));
    }

    let mut tokens = Tokens::new(parts.next().unwrap_or_default());
    let mut points: Option<Vec<(f64, f64)>> = None;
    let mut cells: Option<Vec<Vec<usize>>> = None;
    let mut cell_types: Option<Vec<u8>> = None;

    while let Some(keyword) = tokens.inner.next() {
        match keyword.to_ascii_uppercase().as_str() {
            "DATASET" => {
                let kind = tokens.next("dataset type")?;
                if !kind.eq_ignore_ascii_case("UNSTRUCTURED_GRID") {
                    return Err(MeshIoError::UnsupportedFormat(format!("dataset {}", kind)));
                }
            }
            "FIELD" => skip_field(&mut tokens)?,
            "POINTS" => {
                let n: usize = tokens.parse("point count")?;
                tokens.next("point data type")?;
                let mut pts = Vec::with_capacity(n);
                for _ in 0..n {
                    let x: f64 = tokens.parse("x coordinate")?;
                    let y: f64 = tokens.parse("y coordinate")?;
                    tokens.next("z coordinate")?;
                    pts.push((x, y));
                }
                points = Some(pts);
            }
            "CELLS" => {
                let n: usize = tokens.parse("cell count")?;
                tokens.next("cell list size")?;
                let mut list = Vec::with_capacity(n);
                for _ in 0..n {
                    let k: usize = tokens.parse("cell node count")?;
                    let ids = (0..k)
                        .map(|_| tokens.parse::<usize>("cell node index"))
                        .collect::<Result<Vec<_>, _>>()?;
                    list.push(ids);
                }
                cells = Some(list);
            }
            "CELL_TYPES" => {
                let n: usize = tokens.parse("cell type count")?;
                let types = (0..n)
                    .map(|_| tokens.parse::<u8>("cell type"))
                    .collect::<Result<Vec<_>, _>>()?;
                cell_types = Some(types);
            }
            // Attribute data is not part of the mesh.
            "POINT_DATA" | "CELL_DATA" => break,
            other => {
                return Err(MeshIoError::Parse(format!("unexpected keyword '{}'", other)));
            }
        }
    }

    let points = points.ok_or_else(|| MeshIoError::Parse("missing POINTS section".to_string()))?;
    let cells = cells.ok_or_else(|| MeshIoError::Parse("missing CELLS section".to_string()))?;
    let cell_types =
        cell_types.ok_or_else(|| MeshIoError::Parse("missing CELL_TYPES section".to_string()))?;
    build_mesh(&points, &cells, &cell_types)
}

/// Skip a `FIELD name n` block.
fn skip_field(tokens: &mut Tokens<'_>) -> Result<(), MeshIoError> {
    tokens.next("field name")?;
    let n_arrays: usize = tokens.parse("field array count")?;
    for _ in 0..n_arrays {
        tokens.next("field array name")?;
        let n_components: usize = tokens.parse("field component count")?;
        let n_tuples: usize = tokens.parse("field tuple count")?;
        tokens.next("field data type")?;
        tokens.skip(n_components * n_tuples, "field values")?;
    }
    Ok(())
}

/// Populate a mesh from point coordinates and cell connectivity.
pub(crate) fn build_mesh(
    points: &[(f64, f64)],
    cells: &[Vec<usize>],
    cell_types: &[u8],
) -> Result<Mesh2D, MeshIoError> {
    if cells.len() != cell_types.len() {
        return Err(MeshIoError::Parse(format!(
            "{} cells but {} cell types",
            cells.len(),
            cell_types.len()
        )));
    }

    let mut mesh = Mesh2D::new();
    for (i, &(x, y)) in points.iter().enumerate() {
        mesh.emplace_node(i, x, y)?;
    }
    let mut skipped = 0;
    for (i, (nodes, &cell_type)) in cells.iter().zip(cell_types).enumerate() {
        match supported_cell_nodes(cell_type) {
            Some(n) if n == nodes.len() => {
                mesh.emplace_cell(i, nodes)?;
            }
            Some(n) => {
                return Err(MeshIoError::Parse(format!(
                    "cell {} has type {} but {} nodes (expected {})",
                    i,
                    cell_type,
                    nodes.len(),
                    n
                )));
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        log::debug!("skipped {} cells of unsupported type", skipped);
    }
    mesh.check_walls()?;
    Ok(mesh)
}

/// Write a mesh and its fields as a legacy ASCII VTK unstructured grid.
pub fn write_vtk_snapshot(path: &Path, mesh: &Mesh2D, fields: &FieldData) -> Result<(), MeshIoError> {
    fields.check_lengths(mesh.count_nodes(), mesh.count_cells())?;
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "# vtk DataFile Version 3.0")?;
    writeln!(w, "fv-rs snapshot")?;
    writeln!(w, "ASCII")?;
    writeln!(w, "DATASET UNSTRUCTURED_GRID")?;
    if let Some(time) = fields.time {
        writeln!(w, "FIELD FieldData 1")?;
        writeln!(w, "TIME 1 1 double")?;
        writeln!(w, "{:.10e}", time)?;
    }

    writeln!(w, "POINTS {} double", mesh.count_nodes())?;
    for node in mesh.nodes() {
        let p = node.position();
        writeln!(w, "{:.10e} {:.10e} 0.0", p.x, p.y)?;
    }

    let list_size: usize = mesh.cells().iter().map(|c| c.nodes().len() + 1).sum();
    writeln!(w, "CELLS {} {}", mesh.count_cells(), list_size)?;
    for cell in mesh.cells() {
        write!(w, "{}", cell.nodes().len())?;
        for n in cell.nodes() {
            write!(w, " {}", n.get())?;
        }
        writeln!(w)?;
    }
    writeln!(w, "CELL_TYPES {}", mesh.count_cells())?;
    for cell in mesh.cells() {
        writeln!(w, "{}", vtk_cell_type(cell.shape()))?;
    }

    if !fields.point_data.is_empty() {
        writeln!(w, "POINT_DATA {}", mesh.count_nodes())?;
        write_attributes(&mut w, &fields.point_data)?;
    }
    if !fields.cell_data.is_empty() {
        writeln!(w, "CELL_DATA {}", mesh.count_cells())?;
        write_attributes(&mut w, &fields.cell_data)?;
    }
    w.flush()?;
    Ok(())
}

fn write_attributes<W: Write>(w: &mut W, arrays: &[(String, FieldArray)]) -> std::io::Result<()> {
    for (name, array) in arrays {
        let name = sanitize_name(name);
        match array {
            FieldArray::Scalar(values) => {
                writeln!(w, "SCALARS {} double 1", name)?;
                writeln!(w, "LOOKUP_TABLE default")?;
                for v in values {
                    writeln!(w, "{:.10e}", v)?;
                }
            }
            FieldArray::Vector(values) => {
                writeln!(w, "VECTORS {} double", name)?;
                for v in values {
                    writeln!(w, "{:.10e} {:.10e} 0.0", v.x, v.y)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;
    use tempfile::tempdir;

    const TWO_CELLS: &str = "# vtk DataFile Version 2.0
two cells
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 5 float
0 0 0 1 0 0 1 1 0
0 1 0 2 0 0
CELLS 3 12
4 0 1 2 3
3 1 4 2
2 0 1
CELL_TYPES 3
9
5
3
";

    #[test]
    fn test_parse_mixed_cells() {
        let mesh = parse_vtk(TWO_CELLS).unwrap();
        assert_eq!(mesh.count_nodes(), 5);
        // The line cell is skipped.
        assert_eq!(mesh.count_cells(), 2);
        assert_eq!(mesh.count_walls(), 6);
        assert!((mesh.total_measure() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_binary() {
        let content = TWO_CELLS.replace("ASCII", "BINARY");
        assert!(matches!(
            parse_vtk(&content),
            Err(MeshIoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_rejects_structured_points() {
        let content = TWO_CELLS.replace("UNSTRUCTURED_GRID", "STRUCTURED_POINTS");
        assert!(matches!(
            parse_vtk(&content),
            Err(MeshIoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_truncated_points() {
        let content = "# vtk DataFile Version 3.0\nx\nASCII\nDATASET UNSTRUCTURED_GRID\nPOINTS 3 double\n0 0 0 1 0";
        assert!(matches!(parse_vtk(content), Err(MeshIoError::Parse(_))));
    }

    #[test]
    fn test_type_node_count_mismatch() {
        let content = TWO_CELLS.replace("9\n5\n3", "5\n5\n3");
        assert!(matches!(parse_vtk(&content), Err(MeshIoError::Parse(_))));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.vtk");
        let mesh = parse_vtk(TWO_CELLS).unwrap();

        let mut fields = FieldData::new().with_time(0.25);
        fields.add_cell_field("density", FieldArray::Scalar(vec![1.0, 0.5]));
        fields.add_cell_field(
            "velocity",
            FieldArray::Vector(vec![Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)]),
        );
        fields.add_point_field("node value", FieldArray::Scalar(vec![0.0; 5]));
        write_vtk_snapshot(&path, &mesh, &fields).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("CELL_DATA 2"));
        assert!(content.contains("SCALARS node_value double 1"));
        assert!(content.contains("VECTORS velocity double"));

        let back = read_vtk_mesh(&path).unwrap();
        assert_eq!(back.count_nodes(), mesh.count_nodes());
        assert_eq!(back.count_walls(), mesh.count_walls());
        assert_eq!(back.count_cells(), mesh.count_cells());
        assert!((back.total_measure() - mesh.total_measure()).abs() < 1e-9);
    }

    #[test]
    fn test_write_rejects_wrong_field_length() {
        let dir = tempdir().unwrap();
        let mesh = parse_vtk(TWO_CELLS).unwrap();
        let mut fields = FieldData::new();
        fields.add_cell_field("rho", FieldArray::Scalar(vec![1.0]));
        let result = write_vtk_snapshot(&dir.path().join("bad.vtk"), &mesh, &fields);
        assert!(matches!(result, Err(MeshIoError::FieldLength { .. })));
    }
}
