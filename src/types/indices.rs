//! Strongly-typed arena indices.
//!
//! Nodes, walls and cells live in flat arenas inside [`Mesh2D`](crate::mesh::Mesh2D).
//! Each arena gets its own index type so a wall slot can never be used to
//! address the cell arena.

use std::fmt;

macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw arena position.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Raw arena position.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Iterate over `[0, n)`.
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }

        impl<T> std::ops::Index<$name> for [T] {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for [T] {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }

        impl<T> std::ops::Index<$name> for Vec<T> {
            type Output = T;
            #[inline]
            fn index(&self, idx: $name) -> &T {
                &self[idx.0]
            }
        }

        impl<T> std::ops::IndexMut<$name> for Vec<T> {
            #[inline]
            fn index_mut(&mut self, idx: $name) -> &mut T {
                &mut self[idx.0]
            }
        }
    };
}

define_index!(
    /// Position of a node in the mesh node arena.
    ///
    /// This is not the node's file id; see [`Node::id`](crate::mesh::Node::id).
    ///
    /// ```
    /// use fv_rs::types::NodeIndex;
    ///
    /// let n = NodeIndex::new(3);
    /// assert_eq!(n.get(), 3);
    /// ```
    NodeIndex,
    "N"
);

define_index!(
    /// Position of a wall (edge) in the mesh wall arena.
    WallIndex,
    "W"
);

define_index!(
    /// Position of a cell in the mesh cell arena.
    CellIndex,
    "C"
);
