//! `Entity`: a lightweight handle for one mesh entity
//!
//! Every entity of a mesh (node, edge, face, cell) is identified by its
//! topological dimension, its index within that dimension, and the partition
//! it belongs to. The core only ever reads the dimension and the index; the
//! partition is carried along so partition-local loops can filter on it.

use std::fmt;

/// Handle for a mesh entity: `(dimension, index within dimension, partition)`.
///
/// Ordering is dimension-major, then by index, so sorted entity lists group
/// entities of the same dimension together.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Entity {
    dim: u32,
    index: u32,
    partition: u32,
}

impl Entity {
    /// Creates a handle for entity `index` of dimension `dim` in `partition`.
    ///
    /// # Panics
    ///
    /// Panics if any component does not fit in `u32`.
    #[inline]
    pub fn new(dim: usize, index: usize, partition: usize) -> Self {
        let narrow = |v: usize| u32::try_from(v).expect("entity component exceeds u32");
        Entity {
            dim: narrow(dim),
            index: narrow(index),
            partition: narrow(partition),
        }
    }

    /// Topological dimension (0 = node).
    #[inline]
    pub const fn dim(self) -> usize {
        self.dim as usize
    }

    /// Index of the entity within its dimension.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Partition the entity belongs to.
    #[inline]
    pub const fn partition(self) -> usize {
        self.partition as usize
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Entity")
            .field(&self.dim)
            .field(&self.index)
            .field(&self.partition)
            .finish()
    }
}

/// Prints `d<dim>:<index>`, e.g. `d3:17`.
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}:{}", self.dim, self.index)
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use static_assertions::{assert_eq_size, assert_impl_all};

    assert_eq_size!(Entity, [u32; 3]);
    assert_impl_all!(Entity: Copy, Send, Sync, std::hash::Hash);
}
