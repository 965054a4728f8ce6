//! Unstructured 2D mesh of triangles and quadrilaterals.
//!
//! The mesh stores three arenas:
//! - Nodes: file id and position
//! - Walls: edges shared by at most two cells
//! - Cells: counter-clockwise node loop and bounding walls
//!
//! Side convention:
//! - Every wall is stored with `head.id < tail.id`.
//! - A cell whose counter-clockwise loop walks the wall from head to tail is
//!   the wall's `left` cell; a cell walking it from tail to head is its `right`.
//! - The unit normal `(tail.y - head.y, head.x - tail.x) / length` therefore
//!   points out of the `left` cell and into the `right` cell.

use std::collections::HashMap;

use super::error::TopologyError;
use crate::geometry::{Point2, signed_area};
use crate::types::{CellIndex, NodeIndex, WallIndex};

/// Which adjacent-cell slot of a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// The cell the normal points away from.
    Left,
    /// The cell the normal points into.
    Right,
}

/// A mesh vertex.
#[derive(Clone, Debug)]
pub struct Node {
    id: usize,
    position: Point2,
}

impl Node {
    /// Id assigned by the mesh file.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn position(&self) -> Point2 {
        self.position
    }
}

/// An edge between two nodes, shared by at most two cells.
#[derive(Clone, Debug)]
pub struct Wall {
    id: usize,
    head: NodeIndex,
    tail: NodeIndex,
    left: Option<CellIndex>,
    right: Option<CellIndex>,
}

impl Wall {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Endpoint with the smaller node id.
    pub fn head(&self) -> NodeIndex {
        self.head
    }

    /// Endpoint with the larger node id.
    pub fn tail(&self) -> NodeIndex {
        self.tail
    }

    pub fn left(&self) -> Option<CellIndex> {
        self.left
    }

    pub fn right(&self) -> Option<CellIndex> {
        self.right
    }

    pub fn side(&self, side: Side) -> Option<CellIndex> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Both sides populated.
    pub fn is_interior(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    /// Exactly one side populated.
    pub fn is_boundary(&self) -> bool {
        self.left.is_some() != self.right.is_some()
    }
}

/// Cell shapes the mesh accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellShape {
    Triangle,
    Quadrilateral,
}

impl CellShape {
    pub fn from_node_count(n: usize) -> Option<Self> {
        match n {
            3 => Some(CellShape::Triangle),
            4 => Some(CellShape::Quadrilateral),
            _ => None,
        }
    }

    pub fn n_nodes(self) -> usize {
        match self {
            CellShape::Triangle => 3,
            CellShape::Quadrilateral => 4,
        }
    }
}

/// A polygonal control volume.
#[derive(Clone, Debug)]
pub struct Cell {
    id: usize,
    shape: CellShape,
    /// Counter-clockwise node loop.
    nodes: Vec<NodeIndex>,
    /// walls[i] joins nodes[i] and nodes[i + 1].
    walls: Vec<WallIndex>,
    /// sides[i] is the slot this cell was linked into on walls[i].
    sides: Vec<Side>,
    measure: f64,
    center: Point2,
}

impl Cell {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn shape(&self) -> CellShape {
        self.shape
    }

    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    pub fn walls(&self) -> &[WallIndex] {
        &self.walls
    }

    /// Side this cell occupies on each of its walls, fixed at creation.
    ///
    /// Periodic stitching may later put the same cell in the other slot of a
    /// wall too, so this is the authoritative orientation for the gather.
    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    /// Bounding walls paired with this cell's side on each.
    pub fn oriented_walls(&self) -> impl Iterator<Item = (WallIndex, Side)> + '_ {
        self.walls.iter().copied().zip(self.sides.iter().copied())
    }

    /// Area of the cell. Always strictly positive.
    pub fn measure(&self) -> f64 {
        self.measure
    }

    /// Mean of the vertex positions.
    pub fn center(&self) -> Point2 {
        self.center
    }
}

/// Mesh topology and geometry.
///
/// Populated through the `emplace_*` methods (normally by a mesh reader) and
/// read by the solver. Iteration order is insertion order.
#[derive(Clone, Debug, Default)]
pub struct Mesh2D {
    nodes: Vec<Node>,
    walls: Vec<Wall>,
    cells: Vec<Cell>,
    node_id_to_index: HashMap<usize, NodeIndex>,
    wall_id_to_index: HashMap<usize, WallIndex>,
    cell_id_to_index: HashMap<usize, CellIndex>,
    /// Keyed by (smaller node id, larger node id).
    node_pair_to_wall: HashMap<(usize, usize), WallIndex>,
    next_wall_id: usize,
}

impl Mesh2D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn count_walls(&self) -> usize {
        self.walls.len()
    }

    pub fn count_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn node(&self, n: NodeIndex) -> &Node {
        &self.nodes[n]
    }

    pub fn wall(&self, w: WallIndex) -> &Wall {
        &self.walls[w]
    }

    pub fn cell(&self, c: CellIndex) -> &Cell {
        &self.cells[c]
    }

    pub fn wall_indices(&self) -> impl ExactSizeIterator<Item = WallIndex> {
        WallIndex::iter(self.walls.len())
    }

    pub fn cell_indices(&self) -> impl ExactSizeIterator<Item = CellIndex> {
        CellIndex::iter(self.cells.len())
    }

    pub fn find_node(&self, id: usize) -> Option<NodeIndex> {
        self.node_id_to_index.get(&id).copied()
    }

    pub fn find_wall(&self, id: usize) -> Option<WallIndex> {
        self.wall_id_to_index.get(&id).copied()
    }

    pub fn find_cell(&self, id: usize) -> Option<CellIndex> {
        self.cell_id_to_index.get(&id).copied()
    }

    /// Wall joining the two nodes with the given ids, in either order.
    pub fn find_wall_between(&self, a: usize, b: usize) -> Option<WallIndex> {
        self.node_pair_to_wall.get(&(a.min(b), a.max(b))).copied()
    }

    /// Walls bounding a cell, in loop order.
    pub fn cell_walls(&self, c: CellIndex) -> &[WallIndex] {
        &self.cells[c].walls
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Add a node with a file-assigned id.
    pub fn emplace_node(&mut self, id: usize, x: f64, y: f64) -> Result<NodeIndex, TopologyError> {
        if self.node_id_to_index.contains_key(&id) {
            return Err(TopologyError::DuplicateNode(id));
        }
        let index = NodeIndex::new(self.nodes.len());
        self.nodes.push(Node {
            id,
            position: Point2::new(x, y),
        });
        self.node_id_to_index.insert(id, index);
        Ok(index)
    }

    /// Add a wall with an explicit id.
    ///
    /// Re-adding a wall between the same two nodes is an error.
    pub fn emplace_wall_with_id(
        &mut self,
        id: usize,
        head_id: usize,
        tail_id: usize,
    ) -> Result<WallIndex, TopologyError> {
        let (head_id, tail_id) = (head_id.min(tail_id), head_id.max(tail_id));
        if self.node_pair_to_wall.contains_key(&(head_id, tail_id)) {
            return Err(TopologyError::DuplicateWall {
                head: head_id,
                tail: tail_id,
            });
        }
        if self.wall_id_to_index.contains_key(&id) {
            return Err(TopologyError::DuplicateWallId(id));
        }
        let head = self
            .find_node(head_id)
            .ok_or(TopologyError::UnknownNode(head_id))?;
        let tail = self
            .find_node(tail_id)
            .ok_or(TopologyError::UnknownNode(tail_id))?;
        if head == tail {
            return Err(TopologyError::DegenerateWall(head_id));
        }
        Ok(self.push_wall(id, (head_id, head), (tail_id, tail)))
    }

    /// Append a wall whose id and endpoints are already checked.
    fn push_wall(&mut self, id: usize, head: (usize, NodeIndex), tail: (usize, NodeIndex)) -> WallIndex {
        let index = WallIndex::new(self.walls.len());
        self.walls.push(Wall {
            id,
            head: head.1,
            tail: tail.1,
            left: None,
            right: None,
        });
        self.wall_id_to_index.insert(id, index);
        self.node_pair_to_wall.insert((head.0, tail.0), index);
        self.next_wall_id = self.next_wall_id.max(id + 1);
        index
    }

    fn fresh_wall_id(&self) -> usize {
        let mut id = self.next_wall_id;
        while self.wall_id_to_index.contains_key(&id) {
            id += 1;
        }
        id
    }

    /// Return the wall joining two nodes, creating it with the next unused id
    /// if it does not exist yet.
    pub fn emplace_wall(&mut self, head_id: usize, tail_id: usize) -> Result<WallIndex, TopologyError> {
        if let Some(w) = self.find_wall_between(head_id, tail_id) {
            return Ok(w);
        }
        self.emplace_wall_with_id(self.fresh_wall_id(), head_id, tail_id)
    }

    /// Add a triangle (3 node ids) or quadrilateral (4 node ids).
    ///
    /// Clockwise input is reversed to counter-clockwise. Bounding walls are
    /// created on demand and the cell is linked into their `left` or `right`
    /// slot according to the side convention in the module docs. Every check
    /// runs before the first wall is touched, so an error leaves the mesh
    /// unchanged.
    pub fn emplace_cell(&mut self, id: usize, node_ids: &[usize]) -> Result<CellIndex, TopologyError> {
        let shape = CellShape::from_node_count(node_ids.len()).ok_or(TopologyError::UnsupportedShape {
            cell: id,
            n_nodes: node_ids.len(),
        })?;
        if self.cell_id_to_index.contains_key(&id) {
            return Err(TopologyError::DuplicateCell(id));
        }
        for (i, &nid) in node_ids.iter().enumerate() {
            if node_ids[..i].contains(&nid) {
                return Err(TopologyError::RepeatedNode { cell: id, node: nid });
            }
        }

        let mut loop_nodes = node_ids
            .iter()
            .map(|&nid| self.find_node(nid).ok_or(TopologyError::UnknownNode(nid)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut positions: Vec<Point2> = loop_nodes.iter().map(|&n| self.nodes[n].position).collect();

        let mut area = signed_area(&positions);
        if area < 0.0 {
            loop_nodes.reverse();
            positions.reverse();
            area = -area;
        }
        if area <= f64::EPSILON * bounding_scale(&positions) {
            return Err(TopologyError::DegenerateCell { cell: id, area });
        }

        let n = loop_nodes.len();
        let edges: Vec<((usize, NodeIndex), (usize, NodeIndex), Side)> = (0..n)
            .map(|i| {
                let a = loop_nodes[i];
                let b = loop_nodes[(i + 1) % n];
                let (a_id, b_id) = (self.nodes[a].id, self.nodes[b].id);
                let side = if a_id < b_id { Side::Left } else { Side::Right };
                ((a_id, a), (b_id, b), side)
            })
            .collect();

        for &((a_id, _), (b_id, _), side) in &edges {
            let Some(w) = self.find_wall_between(a_id, b_id) else {
                continue;
            };
            if let Some(existing) = self.walls[w].side(side) {
                return Err(TopologyError::SideOccupied {
                    wall: self.walls[w].id,
                    side,
                    existing: self.cells[existing].id,
                    incoming: id,
                });
            }
        }

        let index = CellIndex::new(self.cells.len());
        let mut walls = Vec::with_capacity(n);
        let mut sides = Vec::with_capacity(n);
        for (a, b, side) in edges {
            let w = match self.find_wall_between(a.0, b.0) {
                Some(w) => w,
                None => {
                    let (head, tail) = if a.0 < b.0 { (a, b) } else { (b, a) };
                    self.push_wall(self.fresh_wall_id(), head, tail)
                }
            };
            self.link(w, side, index);
            walls.push(w);
            sides.push(side);
        }

        let center = positions.iter().fold(Point2::zero(), |acc, p| acc + *p) / n as f64;
        self.cells.push(Cell {
            id,
            shape,
            nodes: loop_nodes,
            walls,
            sides,
            measure: area,
            center,
        });
        self.cell_id_to_index.insert(id, index);
        Ok(index)
    }

    fn link(&mut self, w: WallIndex, side: Side, cell: CellIndex) {
        match side {
            Side::Left => self.walls[w].left = Some(cell),
            Side::Right => self.walls[w].right = Some(cell),
        }
    }

    /// Overwrite one adjacent-cell slot of a wall.
    ///
    /// Used after load only by periodic stitching.
    pub fn set_side(&mut self, w: WallIndex, side: Side, cell: Option<CellIndex>) {
        match side {
            Side::Left => self.walls[w].left = cell,
            Side::Right => self.walls[w].right = cell,
        }
    }

    /// Fail on the first wall with neither side populated.
    pub fn check_walls(&self) -> Result<(), TopologyError> {
        match self.walls.iter().find(|w| w.left.is_none() && w.right.is_none()) {
            Some(w) => Err(TopologyError::OrphanWall(w.id)),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    pub fn head_position(&self, w: WallIndex) -> Point2 {
        self.nodes[self.walls[w].head].position
    }

    pub fn tail_position(&self, w: WallIndex) -> Point2 {
        self.nodes[self.walls[w].tail].position
    }

    pub fn wall_length(&self, w: WallIndex) -> f64 {
        self.head_position(w).distance(&self.tail_position(w))
    }

    pub fn wall_center(&self, w: WallIndex) -> Point2 {
        self.head_position(w).midpoint(&self.tail_position(w))
    }

    /// Unit normal pointing from the `left` cell to the `right` cell.
    pub fn wall_normal(&self, w: WallIndex) -> Point2 {
        let head = self.head_position(w);
        let tail = self.tail_position(w);
        let length = head.distance(&tail);
        (tail - head).rotate_cw() / length
    }

    /// Sum of cell measures.
    pub fn total_measure(&self) -> f64 {
        self.cells.iter().map(|c| c.measure).sum()
    }
}

fn bounding_scale(points: &[Point2]) -> f64 {
    let mut scale: f64 = 0.0;
    for p in points {
        for q in points {
            scale = scale.max(p.distance(q));
        }
    }
    scale * scale
}
