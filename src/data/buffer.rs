//! Buffer: typed dof storage laid out over a mesh.
//!
//! A `Buffer` couples a [`DofLayout`] (computed once from the mesh and the dof
//! specification) with a [`Storage`] holding the values. It borrows the mesh
//! and never mutates it.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Range};

use num_traits::Zero;

use crate::data::dof_layout::DofLayout;
use crate::data::storage::{Storage, VecStorage};
use crate::mesh_error::MeshDispatchError;
use crate::topology::entity::Entity;
use crate::topology::mesh::Mesh;

/// Flat storage of `V` for every dof of a mesh.
pub struct Buffer<'m, M: Mesh, V: Copy, S: Storage<V> = VecStorage<V>> {
    mesh: &'m M,
    dofs: M::Dofs,
    layout: DofLayout,
    storage: S,
    _value: PhantomData<V>,
}

impl<'m, M: Mesh, V: Copy + Zero, S: Storage<V>> Buffer<'m, M, V, S> {
    /// Zero-initialised buffer for `dofs` on `mesh`.
    ///
    /// # Example
    /// ```rust
    /// # fn try_main() -> Result<(), mesh_dispatch::mesh_error::MeshDispatchError> {
    /// use mesh_dispatch::data::CpuBuffer;
    /// use mesh_dispatch::topology::{GridOptions, StructuredGrid};
    /// let grid = StructuredGrid::try_new([4, 4], GridOptions::default())?;
    /// // one dof per cell, nothing else
    /// let u = CpuBuffer::<_, f64>::try_new(&grid, [0, 0, 1, 0])?;
    /// assert_eq!(u.len(), 16);
    /// # Ok(())
    /// # }
    /// # try_main().unwrap();
    /// ```
    pub fn try_new(mesh: &'m M, dofs: M::Dofs) -> Result<Self, MeshDispatchError> {
        Self::try_with_fill(mesh, dofs, V::zero())
    }
}

impl<'m, M: Mesh, V: Copy, S: Storage<V>> Buffer<'m, M, V, S> {
    /// Buffer for `dofs` on `mesh` with every value set to `fill`; storage is
    /// allocated through `S`.
    pub fn try_with_fill(mesh: &'m M, dofs: M::Dofs, fill: V) -> Result<Self, MeshDispatchError> {
        let layout = DofLayout::try_new(mesh, &dofs)?;
        let storage = S::with_len(layout.total_len(), fill);
        Ok(Self {
            mesh,
            dofs,
            layout,
            storage,
            _value: PhantomData,
        })
    }

    /// The mesh the layout was computed on.
    #[inline]
    pub fn mesh(&self) -> &'m M {
        self.mesh
    }

    /// The dof specification.
    #[inline]
    pub fn dof_spec(&self) -> M::Dofs {
        self.dofs
    }

    #[inline]
    pub fn layout(&self) -> &DofLayout {
        &self.layout
    }

    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Value at flat position `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: usize) -> V {
        self.storage.cells()[index].get()
    }

    /// Overwrite the value at flat position `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn set(&self, index: usize, value: V) {
        self.storage.cells()[index].set(value)
    }

    /// Every stored value as cells.
    #[inline]
    pub fn cells(&self) -> &[Cell<V>] {
        self.storage.cells()
    }

    /// Set every stored value to `value`.
    pub fn fill(&self, value: V) {
        for c in self.storage.cells() {
            c.set(value);
        }
    }

    /// Copy of the whole storage array.
    pub fn to_vec(&self) -> Vec<V> {
        self.storage.cells().iter().map(Cell::get).collect()
    }

    /// Storage positions of the dofs of entity `index` in dimension `dim`.
    #[inline]
    pub fn dof_indices(&self, dim: usize, index: usize) -> Range<usize> {
        self.layout.dof_indices(dim, index)
    }

    /// Storage positions of the dofs attached to `entity`.
    #[inline]
    pub fn entity_dofs(&self, entity: Entity) -> Range<usize> {
        self.layout.dof_indices(entity.dim(), entity.index())
    }

    /// `(offset, len)` of dimension `dim`'s whole block.
    #[inline]
    pub fn dof_partition(&self, dim: usize) -> (usize, usize) {
        self.layout.dof_partition(dim)
    }

    /// Cells of dimension `dim`'s whole block.
    pub fn partition_cells(&self, dim: usize) -> &[Cell<V>] {
        let (offset, len) = self.dof_partition(dim);
        &self.storage.cells()[offset..offset + len]
    }

    /// Copy of dimension `dim`'s whole block.
    pub fn partition_values(&self, dim: usize) -> Vec<V> {
        self.partition_cells(dim).iter().map(Cell::get).collect()
    }

    /// Overwrite dimension `dim`'s whole block from `src`, e.g. after a
    /// device download.
    ///
    /// # Errors
    /// Returns `Err(TransferLength)` unless `src` matches the block length.
    pub fn write_partition(&self, dim: usize, src: &[V]) -> Result<(), MeshDispatchError> {
        let (offset, len) = self.dof_partition(dim);
        if src.len() != len {
            return Err(MeshDispatchError::TransferLength {
                expected: len,
                found: src.len(),
            });
        }
        self.storage.write_at(offset, src)
    }

    /// Copy dimension `dim`'s whole block into `dst`, e.g. for a device
    /// upload.
    ///
    /// # Errors
    /// Returns `Err(TransferLength)` unless `dst` matches the block length.
    pub fn read_partition(&self, dim: usize, dst: &mut [V]) -> Result<(), MeshDispatchError> {
        let (offset, len) = self.dof_partition(dim);
        self.storage.read_into(offset, len, dst)
    }

    /// View over an explicit, possibly scattered, set of storage positions.
    ///
    /// # Panics
    /// Panics if any index is past the end of the buffer.
    pub fn range(&self, indices: impl IntoIterator<Item = usize>) -> DofRange<'_, V> {
        let indices: Vec<usize> = indices.into_iter().collect();
        let len = self.len();
        assert!(
            indices.iter().all(|&i| i < len),
            "dof range index out of bounds (len {len})"
        );
        DofRange {
            cells: self.storage.cells(),
            indices,
        }
    }

    /// View over the dofs of every dimension-`dim` entity in the closure of
    /// `entity`, e.g. all node dofs of a cell.
    ///
    /// Entities are visited depth-first in sub-entity order and each one is
    /// listed once.
    pub fn closure_range(&self, entity: Entity, dim: usize) -> DofRange<'_, V> {
        let mut targets = Vec::new();
        collect_closure(self.mesh, entity, dim, &mut targets);
        self.range(targets.into_iter().flat_map(|e| self.entity_dofs(e)))
    }
}

fn collect_closure<M: Mesh>(mesh: &M, entity: Entity, dim: usize, out: &mut Vec<Entity>) {
    if entity.dim() == dim {
        if !out.contains(&entity) {
            out.push(entity);
        }
        return;
    }
    if entity.dim() < dim {
        return;
    }
    for sub in mesh.sub_entities(entity) {
        collect_closure(mesh, sub, dim, out);
    }
}

impl<M: Mesh, V: Copy, S: Storage<V>> fmt::Debug for Buffer<'_, M, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("dofs", &self.dofs)
            .field("layout", &self.layout)
            .field("storage", &self.storage)
            .finish()
    }
}

/// Gather/scatter view over explicit storage positions of one buffer.
///
/// Position `i` of the view addresses storage position `indices()[i]`.
/// Positions may repeat; writes through a repeated position hit the same
/// value.
pub struct DofRange<'b, V> {
    cells: &'b [Cell<V>],
    indices: Vec<usize>,
}

impl<'b, V: Copy> DofRange<'b, V> {
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Storage positions addressed by the view.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn get(&self, i: usize) -> V {
        self.cells[self.indices[i]].get()
    }

    #[inline]
    pub fn set(&self, i: usize, value: V) {
        self.cells[self.indices[i]].set(value)
    }

    /// Add `value` into position `i`.
    #[inline]
    pub fn add(&self, i: usize, value: V)
    where
        V: Add<Output = V>,
    {
        let c = &self.cells[self.indices[i]];
        c.set(c.get() + value);
    }

    pub fn iter(&self) -> impl Iterator<Item = V> + '_ {
        self.indices.iter().map(|&i| self.cells[i].get())
    }

    pub fn to_vec(&self) -> Vec<V> {
        self.iter().collect()
    }
}
