//! Physical kinds a boundary group can be tagged with.
//!
//! The kind selects the ghost-state policy used when evaluating the flux on a
//! wall that has only one adjacent cell.

use std::fmt;

/// Tag identifying the physical type of a boundary group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// Inflow boundary. Uses a prescribed ghost state when one is set,
    /// otherwise zero gradient.
    Inlet,

    /// Outflow boundary (zero gradient).
    Outlet,

    /// Free/transmissive boundary (zero gradient).
    Free,

    /// Solid wall (reflecting ghost state).
    Solid,

    /// Stitched to another group; its walls are interior after pairing.
    Periodic,
}

impl BoundaryKind {
    /// Ghost state is a copy of the interior state.
    pub fn is_zero_gradient(&self) -> bool {
        matches!(self, BoundaryKind::Outlet | BoundaryKind::Free)
    }

    pub fn is_solid(&self) -> bool {
        matches!(self, BoundaryKind::Solid)
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, BoundaryKind::Periodic)
    }

    /// Mass can cross the boundary.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            BoundaryKind::Inlet | BoundaryKind::Outlet | BoundaryKind::Free
        )
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryKind::Inlet => "inlet",
            BoundaryKind::Outlet => "outlet",
            BoundaryKind::Free => "free",
            BoundaryKind::Solid => "solid",
            BoundaryKind::Periodic => "periodic",
        };
        f.write_str(name)
    }
}
