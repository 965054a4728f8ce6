//! VTK XML unstructured grid (`.vtu`) input and output.
//!
//! The writer produces ASCII `DataArray`s readable by ParaView. The reader
//! accepts ASCII `.vtu` files with the same layout (Points, connectivity,
//! offsets, types); binary and appended data are rejected.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::error::MeshIoError;
use super::fields::{FieldArray, FieldData, sanitize_name};
use super::vtk::{build_mesh, vtk_cell_type};
use crate::mesh::Mesh2D;

/// VTK XML writer helper.
struct VtuWriter<W: Write> {
    writer: BufWriter<W>,
    indent: usize,
}

impl<W: Write> VtuWriter<W> {
    fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            indent: 0,
        }
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        for _ in 0..self.indent {
            write!(self.writer, "  ")?;
        }
        Ok(())
    }

    fn write_header(&mut self) -> std::io::Result<()> {
        writeln!(self.writer, "<?xml version=\"1.0\"?>")?;
        writeln!(
            self.writer,
            "<VTKFile type=\"UnstructuredGrid\" version=\"0.1\" byte_order=\"LittleEndian\">"
        )?;
        self.indent += 1;
        Ok(())
    }

    fn write_footer(&mut self) -> std::io::Result<()> {
        self.indent -= 1;
        writeln!(self.writer, "</VTKFile>")?;
        self.writer.flush()?;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attrs: &[(&str, &str)]) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<{}", name)?;
        for (key, value) in attrs {
            write!(self.writer, " {}=\"{}\"", key, value)?;
        }
        writeln!(self.writer, ">")?;
        self.indent += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> std::io::Result<()> {
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</{}>", name)?;
        Ok(())
    }

    /// Write one `DataArray`, breaking lines every `per_line` values.
    fn write_data_array<T: std::fmt::Display>(
        &mut self,
        type_name: &str,
        name: Option<&str>,
        components: usize,
        data: &[T],
        per_line: usize,
    ) -> std::io::Result<()> {
        self.write_indent()?;
        write!(self.writer, "<DataArray type=\"{}\"", type_name)?;
        if let Some(name) = name {
            write!(self.writer, " Name=\"{}\"", name)?;
        }
        if components > 1 {
            write!(self.writer, " NumberOfComponents=\"{}\"", components)?;
        }
        writeln!(self.writer, " format=\"ascii\">")?;

        self.indent += 1;
        self.write_indent()?;
        for (i, v) in data.iter().enumerate() {
            write!(self.writer, "{}", v)?;
            if i + 1 < data.len() {
                if (i + 1) % per_line == 0 {
                    writeln!(self.writer)?;
                    self.write_indent()?;
                } else {
                    write!(self.writer, " ")?;
                }
            }
        }
        writeln!(self.writer)?;
        self.indent -= 1;

        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        Ok(())
    }

    fn write_points(&mut self, mesh: &Mesh2D) -> std::io::Result<()> {
        self.start_element("Points", &[])?;
        let coords: Vec<Sci> = mesh
            .nodes()
            .iter()
            .flat_map(|n| {
                let p = n.position();
                [Sci(p.x), Sci(p.y), Sci(0.0)]
            })
            .collect();
        self.write_data_array("Float64", None, 3, &coords, 6)?;
        self.end_element("Points")?;
        Ok(())
    }

    fn write_cells(&mut self, mesh: &Mesh2D) -> std::io::Result<()> {
        self.start_element("Cells", &[])?;

        let connectivity: Vec<usize> = mesh
            .cells()
            .iter()
            .flat_map(|c| c.nodes().iter().map(|n| n.get()))
            .collect();
        self.write_data_array("Int64", Some("connectivity"), 1, &connectivity, 20)?;

        // Offsets (cumulative vertex count)
        let offsets: Vec<usize> = mesh
            .cells()
            .iter()
            .scan(0, |acc, c| {
                *acc += c.nodes().len();
                Some(*acc)
            })
            .collect();
        self.write_data_array("Int64", Some("offsets"), 1, &offsets, 20)?;

        let types: Vec<u8> = mesh.cells().iter().map(|c| vtk_cell_type(c.shape())).collect();
        self.write_data_array("UInt8", Some("types"), 1, &types, 20)?;

        self.end_element("Cells")?;
        Ok(())
    }

    fn write_attributes(&mut self, section: &str, arrays: &[(String, FieldArray)]) -> std::io::Result<()> {
        if arrays.is_empty() {
            return Ok(());
        }
        self.start_element(section, &[])?;
        for (name, array) in arrays {
            let name = sanitize_name(name);
            match array {
                FieldArray::Scalar(values) => {
                    let data: Vec<Sci> = values.iter().map(|&v| Sci(v)).collect();
                    self.write_data_array("Float64", Some(name.as_str()), 1, &data, 6)?;
                }
                FieldArray::Vector(values) => {
                    let data: Vec<Sci> = values
                        .iter()
                        .flat_map(|v| [Sci(v.x), Sci(v.y), Sci(0.0)])
                        .collect();
                    self.write_data_array("Float64", Some(name.as_str()), 3, &data, 6)?;
                }
            }
        }
        self.end_element(section)?;
        Ok(())
    }

    fn write_time(&mut self, time: f64) -> std::io::Result<()> {
        self.start_element("FieldData", &[])?;
        self.write_indent()?;
        writeln!(
            self.writer,
            "<DataArray type=\"Float64\" Name=\"TIME\" NumberOfTuples=\"1\" format=\"ascii\">"
        )?;
        self.indent += 1;
        self.write_indent()?;
        writeln!(self.writer, "{:.10e}", time)?;
        self.indent -= 1;
        self.write_indent()?;
        writeln!(self.writer, "</DataArray>")?;
        self.end_element("FieldData")?;
        Ok(())
    }
}

/// Scientific notation for floats in data arrays.
struct Sci(f64);

impl std::fmt::Display for Sci {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.10e}", self.0)
    }
}

/// Write a mesh and its fields as an ASCII VTU file.
pub fn write_vtu_snapshot(path: &Path, mesh: &Mesh2D, fields: &FieldData) -> Result<(), MeshIoError> {
    fields.check_lengths(mesh.count_nodes(), mesh.count_cells())?;
    let file = File::create(path)?;
    let mut w = VtuWriter::new(file);

    w.write_header()?;
    w.start_element("UnstructuredGrid", &[])?;
    if let Some(time) = fields.time {
        w.write_time(time)?;
    }
    let n_points = mesh.count_nodes().to_string();
    let n_cells = mesh.count_cells().to_string();
    w.start_element(
        "Piece",
        &[
            ("NumberOfPoints", n_points.as_str()),
            ("NumberOfCells", n_cells.as_str()),
        ],
    )?;
    w.write_points(mesh)?;
    w.write_cells(mesh)?;
    w.write_attributes("PointData", &fields.point_data)?;
    w.write_attributes("CellData", &fields.cell_data)?;
    w.end_element("Piece")?;
    w.end_element("UnstructuredGrid")?;
    w.write_footer()?;
    Ok(())
}

/// Read an ASCII VTU unstructured grid.
pub fn read_vtu_mesh(path: &Path) -> Result<Mesh2D, MeshIoError> {
    let content = fs::read_to_string(path)?;
    parse_vtu(&content)
}

pub(crate) fn parse_vtu(content: &str) -> Result<Mesh2D, MeshIoError> {
    if !content.contains("type=\"UnstructuredGrid\"") {
        return Err(MeshIoError::UnsupportedFormat(
            "VTK XML file is not an UnstructuredGrid".to_string(),
        ));
    }

    let points_section = section(content, "<Points>", "</Points>")?;
    let coords: Vec<f64> = parse_values(data_array_body(points_section, None)?, "point coordinate")?;
    if coords.len() % 3 != 0 {
        return Err(MeshIoError::Parse(format!(
            "{} point coordinates is not a multiple of 3",
            coords.len()
        )));
    }
    let points: Vec<(f64, f64)> = coords.chunks_exact(3).map(|c| (c[0], c[1])).collect();

    let cells_section = section(content, "<Cells>", "</Cells>")?;
    let connectivity: Vec<usize> = parse_values(
        data_array_body(cells_section, Some("connectivity"))?,
        "connectivity",
    )?;
    let offsets: Vec<usize> = parse_values(data_array_body(cells_section, Some("offsets"))?, "offset")?;
    let types: Vec<u8> = parse_values(data_array_body(cells_section, Some("types"))?, "cell type")?;

    let mut cells = Vec::with_capacity(offsets.len());
    let mut start = 0;
    for &end in &offsets {
        if end < start || end > connectivity.len() {
            return Err(MeshIoError::Parse(format!("invalid cell offset {}", end)));
        }
        cells.push(connectivity[start..end].to_vec());
        start = end;
    }
    build_mesh(&points, &cells, &types)
}

fn section<'a>(content: &'a str, open: &str, close: &str) -> Result<&'a str, MeshIoError> {
    let start = content
        .find(open)
        .ok_or_else(|| MeshIoError::Parse(format!("missing {}", open)))?;
    let rest = &content[start + open.len()..];
    let end = rest
        .find(close)
        .ok_or_else(|| MeshIoError::Parse(format!("missing {}", close)))?;
    Ok(&rest[..end])
}

/// Text content of the first `DataArray` in `section`, or of the one with the given name.
fn data_array_body<'a>(section: &'a str, name: Option<&str>) -> Result<&'a str, MeshIoError> {
    let label = name.unwrap_or("Points");
    let start = match name {
        Some(name) => {
            let needle = format!("Name=\"{}\"", name);
            let at = section
                .find(&needle)
                .ok_or_else(|| MeshIoError::Parse(format!("missing DataArray '{}'", name)))?;
            section[..at]
                .rfind("<DataArray")
                .ok_or_else(|| MeshIoError::Parse(format!("malformed DataArray '{}'", name)))?
        }
        None => section
            .find("<DataArray")
            .ok_or_else(|| MeshIoError::Parse(format!("missing DataArray in {}", label)))?,
    };
    let rest = &section[start..];
    let tag_end = rest
        .find('>')
        .ok_or_else(|| MeshIoError::Parse(format!("unterminated DataArray '{}'", label)))?;
    let tag = &rest[..tag_end];
    if !tag.contains("format=\"ascii\"") {
        return Err(MeshIoError::UnsupportedFormat(format!(
            "DataArray '{}' is not ASCII",
            label
        )));
    }
    let body = &rest[tag_end + 1..];
    let close = body
        .find("</DataArray>")
        .ok_or_else(|| MeshIoError::Parse(format!("unterminated DataArray '{}'", label)))?;
    Ok(&body[..close])
}

fn parse_values<T: std::str::FromStr>(body: &str, what: &str) -> Result<Vec<T>, MeshIoError> {
    body.split_whitespace()
        .map(|s| {
            s.parse()
                .map_err(|_| MeshIoError::Parse(format!("invalid {}: '{}'", what, s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;
    use tempfile::tempdir;

    fn square_with_triangle() -> Mesh2D {
        let mut mesh = Mesh2D::new();
        let coords = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (2.0, 0.0)];
        for (id, (x, y)) in coords.into_iter().enumerate() {
            mesh.emplace_node(id, x, y).unwrap();
        }
        mesh.emplace_cell(0, &[0, 1, 2, 3]).unwrap();
        mesh.emplace_cell(1, &[1, 4, 2]).unwrap();
        mesh
    }

    #[test]
    fn test_write_creates_valid_xml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("3.vtu");
        let mesh = square_with_triangle();
        let mut fields = FieldData::new().with_time(1.5);
        fields.add_cell_field("u", FieldArray::Vector(vec![Point2::new(1.0, 2.0); 2]));
        write_vtu_snapshot(&path, &mesh, &fields).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("VTKFile"));
        assert!(content.contains("NumberOfPoints=\"5\""));
        assert!(content.contains("Name=\"TIME\""));
        assert!(content.contains("<CellData>"));
        assert!(!content.contains("<PointData>"));
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.vtu");
        let mesh = square_with_triangle();
        write_vtu_snapshot(&path, &mesh, &FieldData::new()).unwrap();

        let back = read_vtu_mesh(&path).unwrap();
        assert_eq!(back.count_nodes(), 5);
        assert_eq!(back.count_cells(), 2);
        assert_eq!(back.count_walls(), mesh.count_walls());
        assert!((back.total_measure() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_binary_arrays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.vtu");
        write_vtu_snapshot(&path, &square_with_triangle(), &FieldData::new()).unwrap();
        let content = fs::read_to_string(&path)
            .unwrap()
            .replace("format=\"ascii\"", "format=\"binary\"");
        assert!(matches!(
            parse_vtu(&content),
            Err(MeshIoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_cells_section() {
        let content = "<VTKFile type=\"UnstructuredGrid\"><Points><DataArray format=\"ascii\">0 0 0</DataArray></Points></VTKFile>";
        assert!(matches!(parse_vtu(content), Err(MeshIoError::Parse(_))));
    }
}
