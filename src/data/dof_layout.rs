//! DofLayout: Mapping (dimension, entity index) to positions in a flat buffer.
//!
//! Every entity of dimension `d` carries `dofs(d)` degrees of freedom, stored
//! contiguously. Dimensions are laid out as whole blocks, computed once from
//! the dof specification and the mesh's entity counts:
//!
//! ```text
//! [ dim D (cells) | dim D-1 | ... | dim 1 | global | dim 0 (nodes) ]
//! ```
//!
//! Nodes form the tail block. The global block has a fixed size and is
//! shared by every entity.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshDispatchError;
use crate::topology::mesh::{DofSpec, Mesh};
use std::ops::Range;

/// Offset table for one dof specification on one mesh.
///
/// Dimension indices run `0..=cell_dim`; `cell_dim + 1` is the global
/// pseudo-dimension.
///
/// # Invariants
///
/// - `dofs`, `counts` and `offsets` have `cell_dim + 2` entries.
/// - The global dimension has a count of exactly one.
/// - Blocks are contiguous in the order `cell_dim, …, 1, global, 0` and
///   `total_len` is the end of the last block.
///
/// These invariants are checked after construction in debug builds and when
/// the `check-invariants` feature is enabled. Deserialization always checks
/// them and rejects a layout that violates any.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawDofLayout")]
pub struct DofLayout {
    cell_dim: usize,
    dofs: Vec<usize>,
    counts: Vec<usize>,
    offsets: Vec<usize>,
    total_len: usize,
}

impl DofLayout {
    /// Compute the layout of `dofs` on `mesh`.
    ///
    /// The specification length is fixed by `M::Dofs`, so a mismatch is a
    /// compile error:
    ///
    /// ```compile_fail
    /// use mesh_dispatch::data::DofLayout;
    /// use mesh_dispatch::topology::{GridOptions, StructuredGrid};
    /// let grid = StructuredGrid::try_new([2, 2, 2], GridOptions::default()).unwrap();
    /// // a 3-D grid needs five entries
    /// let _ = DofLayout::try_new(&grid, &[1, 0, 0, 0]);
    /// ```
    ///
    /// # Errors
    /// Returns `Err(LayoutOverflow)` if the total size overflows `usize`.
    pub fn try_new<M: Mesh>(mesh: &M, dofs: &M::Dofs) -> Result<Self, MeshDispatchError> {
        let counts: Vec<usize> = (0..=M::CELL_DIM).map(|d| mesh.num_entities(d)).collect();
        Self::try_from_counts(&counts, dofs.counts())
    }

    /// Compute a layout from explicit per-dimension entity counts
    /// (`cell_dim + 1` entries) and dof counts (`cell_dim + 2` entries).
    ///
    /// # Errors
    /// Returns `Err(DofSpecLength)` if the lengths disagree, or
    /// `Err(LayoutOverflow)` if the total size overflows `usize`.
    ///
    /// # Example
    /// ```rust
    /// # fn try_main() -> Result<(), mesh_dispatch::mesh_error::MeshDispatchError> {
    /// use mesh_dispatch::data::DofLayout;
    /// // a 1-D mesh with 4 nodes and 3 cells: 1 dof per node, 2 per cell, 1 global
    /// let layout = DofLayout::try_from_counts(&[4, 3], &[1, 2, 1])?;
    /// assert_eq!(layout.total_len(), 4 + 6 + 1);
    /// assert_eq!(layout.dof_indices(1, 2), 4..6);
    /// assert_eq!(layout.dof_indices(0, 0), 7..8);
    /// # Ok(())
    /// # }
    /// # try_main().unwrap();
    /// ```
    pub fn try_from_counts(
        entity_counts: &[usize],
        dofs: &[usize],
    ) -> Result<Self, MeshDispatchError> {
        if entity_counts.is_empty() || dofs.len() != entity_counts.len() + 1 {
            return Err(MeshDispatchError::DofSpecLength {
                expected: entity_counts.len() + 1,
                found: dofs.len(),
            });
        }
        let cell_dim = entity_counts.len() - 1;
        let global = cell_dim + 1;
        let mut counts = entity_counts.to_vec();
        counts.push(1);

        let mut offsets = vec![0usize; global + 1];
        let mut next = 0usize;
        for d in Self::memory_order(cell_dim) {
            offsets[d] = next;
            let block = dofs[d]
                .checked_mul(counts[d])
                .ok_or(MeshDispatchError::LayoutOverflow { dimension: d })?;
            next = next
                .checked_add(block)
                .ok_or(MeshDispatchError::LayoutOverflow { dimension: d })?;
        }

        let layout = DofLayout {
            cell_dim,
            dofs: dofs.to_vec(),
            counts,
            offsets,
            total_len: next,
        };
        log::debug!(
            "dof layout: dofs={:?} counts={:?} offsets={:?} total={}",
            layout.dofs,
            layout.counts,
            layout.offsets,
            layout.total_len
        );
        layout.debug_assert_invariants();
        Ok(layout)
    }

    /// Dimensions in storage order: cells first, then decreasing dimension
    /// down to edges, then the global block, then nodes.
    pub fn memory_order(cell_dim: usize) -> impl Iterator<Item = usize> {
        (1..=cell_dim).rev().chain([cell_dim + 1, 0])
    }

    /// Topological dimension of the cells.
    #[inline]
    pub fn cell_dim(&self) -> usize {
        self.cell_dim
    }

    /// Index of the global pseudo-dimension (`cell_dim + 1`).
    #[inline]
    pub fn global_dim(&self) -> usize {
        self.cell_dim + 1
    }

    /// Size of the flat storage array.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Dofs per entity of dimension `dim`.
    #[inline]
    pub fn dofs(&self, dim: usize) -> usize {
        self.dofs[dim]
    }

    /// Number of entities of dimension `dim` (one for the global dimension).
    #[inline]
    pub fn count(&self, dim: usize) -> usize {
        self.counts[dim]
    }

    /// First storage position of dimension `dim`'s block.
    #[inline]
    pub fn offset(&self, dim: usize) -> usize {
        self.offsets[dim]
    }

    /// The dof specification the layout was built from.
    pub fn dof_spec(&self) -> &[usize] {
        &self.dofs
    }

    /// `(offset, len)` of dimension `dim`'s whole block.
    #[inline]
    pub fn dof_partition(&self, dim: usize) -> (usize, usize) {
        (self.offsets[dim], self.dofs[dim] * self.counts[dim])
    }

    /// Storage positions of the dofs of entity `index` in dimension `dim`.
    ///
    /// For the global dimension `index` is ignored: every entity shares the
    /// global block.
    ///
    /// # Panics
    /// Panics if `dim` is past the global dimension or `index` is past the
    /// entity count.
    #[inline]
    pub fn dof_indices(&self, dim: usize, index: usize) -> Range<usize> {
        assert!(dim <= self.global_dim(), "dimension {dim} out of range");
        let n = self.dofs[dim];
        if dim == self.global_dim() {
            let start = self.offsets[dim];
            return start..start + n;
        }
        assert!(
            index < self.counts[dim],
            "entity {index} out of range for dimension {dim}"
        );
        let start = self.offsets[dim] + index * n;
        start..start + n
    }

    /// Fallible variant of [`dof_indices`](Self::dof_indices).
    pub fn try_dof_indices(
        &self,
        dim: usize,
        index: usize,
    ) -> Result<Range<usize>, MeshDispatchError> {
        if dim > self.global_dim() {
            return Err(MeshDispatchError::InvalidDimension {
                dimension: dim,
                max: self.global_dim(),
            });
        }
        if dim != self.global_dim() && index >= self.counts[dim] {
            return Err(MeshDispatchError::EntityOutOfRange {
                dimension: dim,
                index,
                count: self.counts[dim],
            });
        }
        Ok(self.dof_indices(dim, index))
    }
}

/// Unchecked serialized form of [`DofLayout`].
#[derive(serde::Deserialize)]
struct RawDofLayout {
    cell_dim: usize,
    dofs: Vec<usize>,
    counts: Vec<usize>,
    offsets: Vec<usize>,
    total_len: usize,
}

impl TryFrom<RawDofLayout> for DofLayout {
    type Error = MeshDispatchError;

    fn try_from(raw: RawDofLayout) -> Result<Self, Self::Error> {
        let layout = DofLayout {
            cell_dim: raw.cell_dim,
            dofs: raw.dofs,
            counts: raw.counts,
            offsets: raw.offsets,
            total_len: raw.total_len,
        };
        layout.validate_invariants()?;
        Ok(layout)
    }
}

impl DebugInvariants for DofLayout {
    fn validate_invariants(&self) -> Result<(), MeshDispatchError> {
        let n = self.cell_dim.saturating_add(2);
        for len in [self.dofs.len(), self.counts.len(), self.offsets.len()] {
            if len != n {
                return Err(MeshDispatchError::DofSpecLength {
                    expected: n,
                    found: len,
                });
            }
        }
        if self.counts[self.global_dim()] != 1 {
            return Err(MeshDispatchError::LayoutMismatch {
                dimension: self.global_dim(),
                expected: 1,
                found: self.counts[self.global_dim()],
            });
        }
        let mut expected = 0usize;
        for d in Self::memory_order(self.cell_dim) {
            if self.offsets[d] != expected {
                return Err(MeshDispatchError::LayoutMismatch {
                    dimension: d,
                    expected,
                    found: self.offsets[d],
                });
            }
            expected = self.dofs[d]
                .checked_mul(self.counts[d])
                .and_then(|b| expected.checked_add(b))
                .ok_or(MeshDispatchError::LayoutOverflow { dimension: d })?;
        }
        if expected != self.total_len {
            return Err(MeshDispatchError::LayoutLength {
                expected,
                found: self.total_len,
            });
        }
        Ok(())
    }
}
