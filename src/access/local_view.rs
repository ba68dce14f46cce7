//! Local views: the window of one buffer a kernel sees for one entity.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Add;

use crate::access::mode::{AccessMode, CanAccumulate, CanRead, CanWrite};
use crate::topology::entity::Entity;

/// Window onto the dofs of one entity, restricted by access mode `Mode`.
///
/// Position `i` of the view is storage position `base_offset() + i`. A view
/// whose pattern did not resolve is *invalid*: it has length zero and
/// indexing it panics.
///
/// Read views have no mutating methods:
///
/// ```compile_fail
/// use mesh_dispatch::access::{LocalView, Read};
/// let v = LocalView::<f64, Read>::invalid();
/// v.set(0, 1.0);
/// ```
pub struct LocalView<'b, V, Mode> {
    cells: &'b [Cell<V>],
    base: usize,
    entity: Option<Entity>,
    _mode: PhantomData<Mode>,
}

impl<V, Mode> Clone for LocalView<'_, V, Mode> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V, Mode> Copy for LocalView<'_, V, Mode> {}

impl<'b, V: Copy, Mode: AccessMode> LocalView<'b, V, Mode> {
    pub(crate) fn new(entity: Entity, base: usize, cells: &'b [Cell<V>]) -> Self {
        Self {
            cells,
            base,
            entity: Some(entity),
            _mode: PhantomData,
        }
    }

    /// The invalid sentinel view.
    pub fn invalid() -> Self {
        Self {
            cells: &[],
            base: 0,
            entity: None,
            _mode: PhantomData,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.entity.is_some()
    }

    /// Number of dofs in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Entity whose dofs are exposed, if the view is valid.
    #[inline]
    pub fn entity(&self) -> Option<Entity> {
        self.entity
    }

    /// Storage position of the first dof.
    #[inline]
    pub fn base_offset(&self) -> usize {
        self.base
    }

    #[inline]
    fn cell(&self, i: usize) -> &'b Cell<V> {
        assert!(self.is_valid(), "indexing an invalid local view");
        &self.cells[i]
    }
}

impl<'b, V: Copy, Mode: CanRead> LocalView<'b, V, Mode> {
    #[inline]
    pub fn get(&self, i: usize) -> V {
        self.cell(i).get()
    }

    pub fn iter(&self) -> impl Iterator<Item = V> + 'b {
        self.cells.iter().map(Cell::get)
    }

    pub fn to_vec(&self) -> Vec<V> {
        self.iter().collect()
    }
}

impl<V: Copy, Mode: CanWrite> LocalView<'_, V, Mode> {
    #[inline]
    pub fn set(&self, i: usize, value: V) {
        self.cell(i).set(value)
    }

    pub fn fill(&self, value: V) {
        for c in self.cells {
            c.set(value);
        }
    }

    /// # Panics
    /// Panics if `src.len() != self.len()`.
    pub fn copy_from_slice(&self, src: &[V]) {
        assert_eq!(src.len(), self.len(), "source length differs from view");
        for (c, &v) in self.cells.iter().zip(src) {
            c.set(v);
        }
    }
}

impl<V: Copy + Add<Output = V>, Mode: CanAccumulate> LocalView<'_, V, Mode> {
    /// Add `value` into position `i`.
    #[inline]
    pub fn add(&self, i: usize, value: V) {
        let c = self.cell(i);
        c.set(c.get() + value);
    }
}

impl<V, Mode: AccessMode> fmt::Debug for LocalView<'_, V, Mode> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalView")
            .field("mode", &Mode::NAME)
            .field("entity", &self.entity)
            .field("base", &self.base)
            .field("len", &self.cells.len())
            .finish()
    }
}
