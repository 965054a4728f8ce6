//! Named groups of boundary walls and periodic stitching.
//!
//! The registry records the set of boundary walls when it is created. Groups
//! are then carved out of that set with predicates, tagged with a kind, and
//! optionally paired as periodic boundaries. [`BoundaryRegistry::validate`]
//! checks that every recorded boundary wall landed in exactly one group.
//!
//! # Example
//! ```
//! use fv_rs::boundary::BoundaryRegistry;
//! use fv_rs::mesh::Mesh2D;
//!
//! let mut mesh = Mesh2D::new();
//! for (id, (x, y)) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].into_iter().enumerate() {
//!     mesh.emplace_node(id, x, y).unwrap();
//! }
//! mesh.emplace_cell(0, &[0, 1, 2, 3]).unwrap();
//!
//! let mut registry = BoundaryRegistry::new(&mesh);
//! registry.register_group(&mesh, "left", |w| w.center.x < 1e-12).unwrap();
//! registry.register_group(&mesh, "rest", |w| w.center.x >= 1e-12).unwrap();
//! registry.mark_free("left").unwrap();
//! registry.mark_solid("rest").unwrap();
//! assert!(registry.validate().is_ok());
//! ```

use std::collections::HashMap;

use super::error::BoundaryError;
use crate::geometry::Point2;
use crate::mesh::{BoundaryKind, Mesh2D, Side};
use crate::types::WallIndex;

/// Geometry of a boundary wall, handed to group predicates.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryWall {
    pub index: WallIndex,
    /// Mesh-file id of the wall.
    pub id: usize,
    pub head: Point2,
    pub tail: Point2,
    pub center: Point2,
}

/// A named, ordered sequence of boundary walls.
#[derive(Clone, Debug)]
pub struct BoundaryGroup {
    name: String,
    walls: Vec<WallIndex>,
    kind: Option<BoundaryKind>,
}

impl BoundaryGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn walls(&self) -> &[WallIndex] {
        &self.walls
    }

    /// Kind the group was marked with, if any.
    pub fn kind(&self) -> Option<BoundaryKind> {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

/// Two groups stitched together wall by wall.
#[derive(Clone, Debug)]
pub struct PeriodicPair {
    pub first: String,
    pub second: String,
    /// Matched walls, ordered by midpoint (y first, then x).
    pub walls: Vec<(WallIndex, WallIndex)>,
}

#[derive(Clone, Debug)]
struct DoubleRegistration {
    wall: usize,
    first: usize,
    second: usize,
}

/// Registry of boundary groups for one mesh.
#[derive(Clone, Debug, Default)]
pub struct BoundaryRegistry {
    groups: Vec<BoundaryGroup>,
    group_lookup: HashMap<String, usize>,
    /// Wall -> first group that claimed it.
    membership: HashMap<WallIndex, usize>,
    double_registrations: Vec<DoubleRegistration>,
    /// Boundary walls recorded at construction, cleared by a successful `validate`.
    unclassified: Vec<WallIndex>,
    expected: usize,
    pairs: Vec<PeriodicPair>,
    validated: bool,
}

impl BoundaryRegistry {
    /// Record every wall of `mesh` that has exactly one adjacent cell.
    pub fn new(mesh: &Mesh2D) -> Self {
        let unclassified: Vec<WallIndex> = mesh
            .wall_indices()
            .filter(|&w| mesh.wall(w).is_boundary())
            .collect();
        let expected = unclassified.len();
        log::debug!("boundary registry recorded {} boundary walls", expected);
        Self {
            unclassified,
            expected,
            ..Self::default()
        }
    }

    /// Number of boundary walls recorded at construction.
    pub fn expected_boundary_walls(&self) -> usize {
        self.expected
    }

    /// Boundary walls recorded at construction. Empty after a successful `validate`.
    pub fn unclassified(&self) -> &[WallIndex] {
        &self.unclassified
    }

    pub fn groups(&self) -> &[BoundaryGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&BoundaryGroup> {
        self.group_lookup.get(name).map(|&g| &self.groups[g])
    }

    pub fn periodic_pairs(&self) -> &[PeriodicPair] {
        &self.pairs
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Group that first claimed `wall`.
    pub fn group_of(&self, wall: WallIndex) -> Option<&BoundaryGroup> {
        self.membership.get(&wall).map(|&g| &self.groups[g])
    }

    /// Kind of the group that first claimed `wall`.
    pub fn kind_of(&self, wall: WallIndex) -> Option<BoundaryKind> {
        self.group_of(wall).and_then(|g| g.kind)
    }

    /// Add every recorded boundary wall matching `predicate` to a new group.
    ///
    /// Returns the number of walls in the new group. A wall already claimed by
    /// another group is still added, and the conflict is reported by `validate`.
    pub fn register_group<F>(
        &mut self,
        mesh: &Mesh2D,
        name: &str,
        predicate: F,
    ) -> Result<usize, BoundaryError>
    where
        F: Fn(&BoundaryWall) -> bool,
    {
        if self.group_lookup.contains_key(name) {
            return Err(BoundaryError::DuplicateGroup(name.to_string()));
        }
        let group_index = self.groups.len();
        let mut walls = Vec::new();

        for &w in &self.unclassified {
            let view = BoundaryWall {
                index: w,
                id: mesh.wall(w).id(),
                head: mesh.head_position(w),
                tail: mesh.tail_position(w),
                center: mesh.wall_center(w),
            };
            if !predicate(&view) {
                continue;
            }
            match self.membership.get(&w) {
                Some(&first) => {
                    log::warn!(
                        "wall {} matched by '{}' is already in '{}'",
                        view.id,
                        name,
                        self.groups[first].name
                    );
                    self.double_registrations.push(DoubleRegistration {
                        wall: view.id,
                        first,
                        second: group_index,
                    });
                }
                None => {
                    self.membership.insert(w, group_index);
                }
            }
            walls.push(w);
        }

        if walls.is_empty() {
            log::warn!("boundary group '{}' matched no walls", name);
        } else {
            log::debug!("boundary group '{}' has {} walls", name, walls.len());
        }
        let n = walls.len();
        self.groups.push(BoundaryGroup {
            name: name.to_string(),
            walls,
            kind: None,
        });
        self.group_lookup.insert(name.to_string(), group_index);
        Ok(n)
    }

    /// Tag a group with a kind. Periodic groups cannot be re-tagged.
    pub fn mark(&mut self, name: &str, kind: BoundaryKind) -> Result<(), BoundaryError> {
        let g = self.lookup(name)?;
        let group = &mut self.groups[g];
        if group.kind == Some(BoundaryKind::Periodic) {
            return Err(BoundaryError::AlreadyPaired(name.to_string()));
        }
        if kind == BoundaryKind::Periodic {
            return Err(BoundaryError::PeriodicNeedsPartner(name.to_string()));
        }
        if let Some(previous) = group.kind {
            log::debug!("boundary group '{}' re-marked from {} to {}", name, previous, kind);
        }
        group.kind = Some(kind);
        Ok(())
    }

    pub fn mark_inlet(&mut self, name: &str) -> Result<(), BoundaryError> {
        self.mark(name, BoundaryKind::Inlet)
    }

    pub fn mark_outlet(&mut self, name: &str) -> Result<(), BoundaryError> {
        self.mark(name, BoundaryKind::Outlet)
    }

    pub fn mark_free(&mut self, name: &str) -> Result<(), BoundaryError> {
        self.mark(name, BoundaryKind::Free)
    }

    pub fn mark_solid(&mut self, name: &str) -> Result<(), BoundaryError> {
        self.mark(name, BoundaryKind::Solid)
    }

    /// Stitch two equally sized groups into a periodic pair.
    ///
    /// Both groups are sorted by wall midpoint (y first, then x) and matched
    /// by position. The empty slot of each wall is filled with the cell
    /// adjacent to its partner, so both walls become interior.
    pub fn pair_periodic(
        &mut self,
        mesh: &mut Mesh2D,
        first: &str,
        second: &str,
    ) -> Result<&PeriodicPair, BoundaryError> {
        if first == second {
            return Err(BoundaryError::SelfPeriodic(first.to_string()));
        }
        let ga = self.lookup(first)?;
        let gb = self.lookup(second)?;
        for &g in &[ga, gb] {
            if self.groups[g].kind == Some(BoundaryKind::Periodic) {
                return Err(BoundaryError::AlreadyPaired(self.groups[g].name.clone()));
            }
        }
        let (len_a, len_b) = (self.groups[ga].len(), self.groups[gb].len());
        if len_a != len_b {
            log::error!(
                "periodic groups '{}' and '{}' differ in size ({} vs {})",
                first,
                second,
                len_a,
                len_b
            );
            return Err(BoundaryError::MismatchedPeriodicSizes {
                first: first.to_string(),
                second: second.to_string(),
                first_len: len_a,
                second_len: len_b,
            });
        }

        let sort_by_midpoint = |walls: &mut Vec<WallIndex>| {
            walls.sort_by(|&a, &b| {
                let (pa, pb) = (mesh.wall_center(a), mesh.wall_center(b));
                pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
            });
        };
        let mut walls_a = self.groups[ga].walls.clone();
        let mut walls_b = self.groups[gb].walls.clone();
        sort_by_midpoint(&mut walls_a);
        sort_by_midpoint(&mut walls_b);

        let walls: Vec<(WallIndex, WallIndex)> = walls_a.into_iter().zip(walls_b).collect();
        for &(a, b) in &walls {
            sew(mesh, a, b);
        }

        self.groups[ga].kind = Some(BoundaryKind::Periodic);
        self.groups[gb].kind = Some(BoundaryKind::Periodic);
        log::info!(
            "paired '{}' and '{}' as periodic ({} walls each)",
            first,
            second,
            walls.len()
        );
        self.pairs.push(PeriodicPair {
            first: first.to_string(),
            second: second.to_string(),
            walls,
        });
        let last = self.pairs.len() - 1;
        Ok(&self.pairs[last])
    }

    /// Check that every recorded boundary wall is in exactly one group.
    ///
    /// On success the raw set of recorded boundary walls is cleared.
    pub fn validate(&mut self) -> Result<(), BoundaryError> {
        if let Some(dup) = self.double_registrations.first() {
            let err = BoundaryError::DoubleRegistration {
                wall: dup.wall,
                first: self.groups[dup.first].name.clone(),
                second: self.groups[dup.second].name.clone(),
            };
            log::error!("{}", err);
            return Err(err);
        }

        let registered: usize = self.groups.iter().map(BoundaryGroup::len).sum();
        if registered != self.expected {
            let err = BoundaryError::Coverage {
                registered,
                expected: self.expected,
            };
            log::error!("{}", err);
            return Err(err);
        }

        for group in self.groups.iter().filter(|g| g.kind.is_none()) {
            log::warn!(
                "boundary group '{}' has no kind; treating it as zero gradient",
                group.name
            );
        }
        self.unclassified.clear();
        self.validated = true;
        log::info!(
            "boundary check passed: {} walls in {} groups, {} periodic pairs",
            registered,
            self.groups.len(),
            self.pairs.len()
        );
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<usize, BoundaryError> {
        self.group_lookup
            .get(name)
            .copied()
            .ok_or_else(|| BoundaryError::UnknownGroup(name.to_string()))
    }
}

/// Fill the empty slot of `a` and `b` with the cell across the partner wall.
fn sew(mesh: &mut Mesh2D, a: WallIndex, b: WallIndex) {
    let (a_left, a_right) = (mesh.wall(a).left(), mesh.wall(a).right());
    let (b_left, b_right) = (mesh.wall(b).left(), mesh.wall(b).right());
    match (a_left, b_left) {
        (None, None) => {
            mesh.set_side(a, Side::Left, b_right);
            mesh.set_side(b, Side::Left, a_right);
        }
        (None, Some(_)) => {
            mesh.set_side(a, Side::Left, b_left);
            mesh.set_side(b, Side::Right, a_right);
        }
        (Some(_), None) => {
            mesh.set_side(a, Side::Right, b_right);
            mesh.set_side(b, Side::Left, a_left);
        }
        (Some(_), Some(_)) => {
            mesh.set_side(a, Side::Right, b_left);
            mesh.set_side(b, Side::Right, a_left);
        }
    }
}
