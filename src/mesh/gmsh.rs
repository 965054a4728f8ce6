//! Gmsh mesh file input.
//!
//! Supports reading Gmsh MSH format version 2.2 (ASCII).
//!
//! ## Supported Element Types
//! - 2 = Triangle (3-node)
//! - 3 = Quadrilateral (4-node)
//! - 1 = Line (2-node). Lines carry no cell; their physical tag is kept so
//!   boundary groups can be registered from it.
//!
//! Other element types (points, higher-order cells) are skipped.
//!
//! ## Example
//! ```no_run
//! use fv_rs::mesh::gmsh::read_gmsh_mesh;
//! use std::path::Path;
//!
//! let gmsh = read_gmsh_mesh(Path::new("channel.msh")).expect("Failed to read mesh");
//! println!("{} cells", gmsh.mesh.count_cells());
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use super::error::TopologyError;
use super::mesh2d::Mesh2D;
use crate::types::WallIndex;

/// Error type for Gmsh input.
#[derive(Debug, Error)]
pub enum GmshError {
    /// File could not be opened or read.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid file format.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Unsupported mesh format version.
    #[error("Unsupported Gmsh version: {0}")]
    UnsupportedVersion(String),

    /// Missing required section.
    #[error("Missing section: {0}")]
    MissingSection(String),

    /// Elements do not form a valid mesh.
    #[error("Invalid topology: {0}")]
    Topology(#[from] TopologyError),
}

/// Gmsh element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GmshElementType {
    Line,
    Triangle,
    Quadrilateral,
}

impl GmshElementType {
    fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(GmshElementType::Line),
            2 => Some(GmshElementType::Triangle),
            3 => Some(GmshElementType::Quadrilateral),
            _ => None,
        }
    }
}

/// A mesh read from Gmsh together with the physical tags of its boundary lines.
#[derive(Clone, Debug)]
pub struct GmshMesh {
    pub mesh: Mesh2D,
    /// Physical tag per wall, for walls that appeared as tagged line elements.
    pub physical_tags: HashMap<WallIndex, u32>,
}

impl GmshMesh {
    /// Physical tag of a wall, if the file declared one.
    pub fn physical_tag(&self, wall: WallIndex) -> Option<u32> {
        self.physical_tags.get(&wall).copied()
    }
}

struct ParsedElements {
    /// (element id, node ids)
    cells: Vec<(usize, Vec<usize>)>,
    /// (node id, node id, physical tag)
    lines: Vec<(usize, usize, u32)>,
}

/// Read a Gmsh MSH file (format 2.2).
///
/// Node ids and element ids are taken from the file.
pub fn read_gmsh_mesh(path: &Path) -> Result<GmshMesh, GmshError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut lines = reader.lines();
    let mut nodes: Vec<(usize, f64, f64)> = Vec::new();
    let mut elements: Option<ParsedElements> = None;

    while let Some(line_result) = lines.next() {
        let line = line_result?;
        let line = line.trim();

        if line.starts_with("$MeshFormat") {
            parse_mesh_format(&mut lines)?;
        } else if line.starts_with("$Nodes") {
            nodes = parse_nodes(&mut lines)?;
        } else if line.starts_with("$Elements") {
            elements = Some(parse_elements(&mut lines)?);
        }
    }

    if nodes.is_empty() {
        return Err(GmshError::MissingSection("Nodes".to_string()));
    }
    let elements = match elements {
        Some(e) if !e.cells.is_empty() => e,
        _ => {
            return Err(GmshError::MissingSection(
                "Elements (triangles or quadrilaterals)".to_string(),
            ));
        }
    };

    let mut mesh = Mesh2D::new();
    for (id, x, y) in nodes {
        mesh.emplace_node(id, x, y)?;
    }
    for (id, node_ids) in &elements.cells {
        mesh.emplace_cell(*id, node_ids)?;
    }

    let mut physical_tags = HashMap::new();
    for (a, b, tag) in elements.lines {
        if let Some(w) = mesh.find_wall_between(a, b) {
            physical_tags.insert(w, tag);
        } else {
            log::warn!("gmsh line element {}-{} does not match any cell edge", a, b);
        }
    }

    Ok(GmshMesh {
        mesh,
        physical_tags,
    })
}

/// Parse the $MeshFormat section.
fn parse_mesh_format<I>(lines: &mut I) -> Result<(), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    if let Some(line_result) = lines.next() {
        let line = line_result?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let version = parts
            .first()
            .ok_or_else(|| GmshError::ParseError("Empty MeshFormat line".to_string()))?;
        if !version.starts_with("2.") {
            return Err(GmshError::UnsupportedVersion(version.to_string()));
        }

        skip_to(lines, "$EndMeshFormat")?;
    }
    Ok(())
}

/// Upper bound on capacity reserved from a count read in the file header.
const MAX_PREALLOCATED: usize = 1 << 16;

/// Parse the $Nodes section into (id, x, y).
fn parse_nodes<I>(lines: &mut I) -> Result<Vec<(usize, f64, f64)>, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let n_nodes = parse_count(lines, "node")?;
    let mut nodes = Vec::with_capacity(n_nodes.min(MAX_PREALLOCATED));

    for _ in 0..n_nodes {
        let line = next_line(lines, "node")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(GmshError::ParseError(format!("Invalid node line: {}", line)));
        }

        // Format: node_id x y z
        let id: usize = parse_field(parts[0], "node id")?;
        let x: f64 = parse_field(parts[1], "x coordinate")?;
        let y: f64 = parse_field(parts[2], "y coordinate")?;
        nodes.push((id, x, y));
    }

    skip_to(lines, "$EndNodes")?;
    Ok(nodes)
}

/// Parse the $Elements section.
fn parse_elements<I>(lines: &mut I) -> Result<ParsedElements, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let n_elements = parse_count(lines, "element")?;
    let mut parsed = ParsedElements {
        cells: Vec::new(),
        lines: Vec::new(),
    };

    for _ in 0..n_elements {
        let line = next_line(lines, "element")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return Err(GmshError::ParseError(format!("Invalid element line: {}", line)));
        }

        // Format: elem_id elem_type n_tags tag1 ... tagN node1 node2 ...
        let elem_id: usize = parse_field(parts[0], "element id")?;
        let elem_type: i32 = parse_field(parts[1], "element type")?;
        let n_tags: usize = parse_field(parts[2], "tag count")?;
        let physical_tag = if n_tags > 0 && parts.len() > 3 {
            parse_field::<u32>(parts[3], "physical tag")?
        } else {
            0
        };

        let node_start = n_tags
            .checked_add(3)
            .ok_or_else(|| GmshError::ParseError(format!("Invalid tag count: {}", n_tags)))?;
        let Some(elem_type) = GmshElementType::from_code(elem_type) else {
            continue;
        };
        let n_nodes = match elem_type {
            GmshElementType::Line => 2,
            GmshElementType::Triangle => 3,
            GmshElementType::Quadrilateral => 4,
        };
        if parts.len().saturating_sub(node_start) < n_nodes {
            return Err(GmshError::ParseError(format!(
                "Element {} needs {} nodes",
                elem_id, n_nodes
            )));
        }
        let node_ids = parts[node_start..node_start + n_nodes]
            .iter()
            .map(|s| parse_field::<usize>(s, "node reference"))
            .collect::<Result<Vec<_>, _>>()?;

        match elem_type {
            GmshElementType::Line => parsed.lines.push((node_ids[0], node_ids[1], physical_tag)),
            _ => parsed.cells.push((elem_id, node_ids)),
        }
    }

    skip_to(lines, "$EndElements")?;
    Ok(parsed)
}

fn next_line<I>(lines: &mut I, what: &str) -> Result<String, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    match lines.next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => Err(GmshError::ParseError(format!("Unexpected end of file in {} list", what))),
    }
}

fn parse_count<I>(lines: &mut I, what: &str) -> Result<usize, GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let line = next_line(lines, what)?;
    line.parse::<usize>()
        .map_err(|_| GmshError::ParseError(format!("Invalid {} count: {}", what, line)))
}

fn parse_field<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, GmshError> {
    s.parse()
        .map_err(|_| GmshError::ParseError(format!("Invalid {}: {}", what, s)))
}

/// Skip to the end marker of the current section.
fn skip_to<I>(lines: &mut I, marker: &str) -> Result<(), GmshError>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    for line_result in lines.by_ref() {
        if line_result?.trim().starts_with(marker) {
            return Ok(());
        }
    }
    Err(GmshError::MissingSection(marker.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_simple_mesh() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
4
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
$EndNodes
$Elements
1
1 3 2 0 0 1 2 3 4
$EndElements"#
        )
        .unwrap();

        let gmsh = read_gmsh_mesh(file.path()).unwrap();
        assert_eq!(gmsh.mesh.count_nodes(), 4);
        assert_eq!(gmsh.mesh.count_cells(), 1);
        assert_eq!(gmsh.mesh.count_walls(), 4);
        assert!(gmsh.mesh.walls().iter().all(|w| w.is_boundary()));
    }

    #[test]
    fn test_mixed_cells_and_physical_tags() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
5
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 1.0 1.0 0.0
4 0.0 1.0 0.0
5 2.0 0.5 0.0
$EndNodes
$Elements
4
1 1 2 7 1 1 4
2 1 2 8 2 2 5
3 3 2 0 0 1 2 3 4
4 2 2 0 0 2 5 3
$EndElements"#
        )
        .unwrap();

        let gmsh = read_gmsh_mesh(file.path()).unwrap();
        assert_eq!(gmsh.mesh.count_cells(), 2);
        assert_eq!(gmsh.mesh.count_walls(), 6);
        assert!((gmsh.mesh.total_measure() - 1.5).abs() < 1e-12);

        let left = gmsh.mesh.find_wall_between(1, 4).unwrap();
        let slanted = gmsh.mesh.find_wall_between(2, 5).unwrap();
        assert_eq!(gmsh.physical_tag(left), Some(7));
        assert_eq!(gmsh.physical_tag(slanted), Some(8));

        let shared = gmsh.mesh.find_wall_between(2, 3).unwrap();
        assert!(gmsh.mesh.wall(shared).is_interior());
        assert_eq!(gmsh.physical_tag(shared), None);
    }

    #[test]
    fn test_error_missing_nodes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Elements
1
1 3 2 0 0 1 2 3 4
$EndElements"#
        )
        .unwrap();

        let result = read_gmsh_mesh(file.path());
        assert!(matches!(result, Err(GmshError::MissingSection(_))));
    }

    #[test]
    fn test_unsupported_version() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
4.1 0 8
$EndMeshFormat"#
        )
        .unwrap();

        let result = read_gmsh_mesh(file.path());
        assert!(matches!(result, Err(GmshError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = read_gmsh_mesh(Path::new("/nonexistent/mesh.msh"));
        assert!(matches!(result, Err(GmshError::IoError(_))));
    }

    #[test]
    fn test_corrupt_counts_are_parse_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
18446744073709551615
1 0.0 0.0 0.0
$EndNodes"#
        )
        .unwrap();
        let result = read_gmsh_mesh(file.path());
        assert!(matches!(result, Err(GmshError::ParseError(_))));

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
3
1 0.0 0.0 0.0
2 1.0 0.0 0.0
3 0.0 1.0 0.0
$EndNodes
$Elements
1
1 2 18446744073709551615 0 1 2 3
$EndElements"#
        )
        .unwrap();
        let result = read_gmsh_mesh(file.path());
        assert!(matches!(result, Err(GmshError::ParseError(_))));
    }
}
