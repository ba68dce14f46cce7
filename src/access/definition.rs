//! Access definitions: buffer + dimension + pattern + mode.
//!
//! An [`AccessDefinition`] is built once, outside any loop, and projected to a
//! [`LocalView`] for every entity the loop visits. The helpers at the bottom
//! of this module build the common definitions; the mode adapters change only
//! the mode.
//!
//! ```rust
//! # fn try_main() -> Result<(), mesh_dispatch::mesh_error::MeshDispatchError> {
//! use mesh_dispatch::access::{cell, neighboring_or_self, read};
//! use mesh_dispatch::data::CpuBuffer;
//! use mesh_dispatch::topology::{GridOptions, Mesh, StructuredGrid};
//!
//! let grid = StructuredGrid::try_new([3], GridOptions::default())?;
//! let u = CpuBuffer::<_, f64>::try_new(&grid, [0, 1, 0])?;
//! let left = read(neighboring_or_self(&u, 0));
//! let here = cell(&u).write();
//!
//! here.project(grid.entity(1, 1)?).set(0, 2.0);
//! assert_eq!(left.project(grid.entity(1, 2)?).get(0), 2.0);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::access::local_view::LocalView;
use crate::access::mode::{AccessMode, Accumulate, Read, ReadWrite, Write};
use crate::access::pattern::AccessPattern;
use crate::data::buffer::Buffer;
use crate::data::storage::{Storage, VecStorage};
use crate::topology::entity::Entity;
use crate::topology::mesh::Mesh;

/// Description of how a loop body sees one buffer.
pub struct AccessDefinition<'b, M: Mesh, V: Copy, Mode = ReadWrite, S: Storage<V> = VecStorage<V>>
{
    buffer: &'b Buffer<'b, M, V, S>,
    dim: usize,
    pattern: AccessPattern,
    _mode: PhantomData<Mode>,
}

impl<M: Mesh, V: Copy, Mode, S: Storage<V>> Clone for AccessDefinition<'_, M, V, Mode, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Mesh, V: Copy, Mode, S: Storage<V>> Copy for AccessDefinition<'_, M, V, Mode, S> {}

impl<'b, M: Mesh, V: Copy, Mode: AccessMode, S: Storage<V>> AccessDefinition<'b, M, V, Mode, S> {
    /// Definition over the dimension-`dim` dofs of `buffer`. `dim` may be the
    /// global dimension `CELL_DIM + 1`.
    pub fn new(buffer: &'b Buffer<'b, M, V, S>, dim: usize, pattern: AccessPattern) -> Self {
        Self {
            buffer,
            dim,
            pattern,
            _mode: PhantomData,
        }
    }

    #[inline]
    pub fn buffer(&self) -> &'b Buffer<'b, M, V, S> {
        self.buffer
    }

    /// Dimension whose dofs are exposed.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn pattern(&self) -> AccessPattern {
        self.pattern
    }

    /// Same buffer, dimension and pattern under another mode.
    #[inline]
    pub fn with_mode<N: AccessMode>(self) -> AccessDefinition<'b, M, V, N, S> {
        AccessDefinition {
            buffer: self.buffer,
            dim: self.dim,
            pattern: self.pattern,
            _mode: PhantomData,
        }
    }

    #[inline]
    pub fn read(self) -> AccessDefinition<'b, M, V, Read, S> {
        self.with_mode()
    }

    #[inline]
    pub fn write(self) -> AccessDefinition<'b, M, V, Write, S> {
        self.with_mode()
    }

    #[inline]
    pub fn read_write(self) -> AccessDefinition<'b, M, V, ReadWrite, S> {
        self.with_mode()
    }

    #[inline]
    pub fn accumulate(self) -> AccessDefinition<'b, M, V, Accumulate, S> {
        self.with_mode()
    }

    /// Local view for the iterated `entity`.
    ///
    /// The global dimension always maps to the single global block. For any
    /// other dimension the pattern is resolved on the buffer's mesh; the
    /// result is the invalid sentinel when the pattern does not resolve or
    /// resolves to an entity of another dimension.
    pub fn project(&self, entity: Entity) -> LocalView<'b, V, Mode> {
        let buffer = self.buffer;
        let layout = buffer.layout();
        let global = layout.global_dim();
        if self.dim > global {
            return LocalView::invalid();
        }
        let target = if self.dim == global {
            entity
        } else {
            match self.pattern.resolve(buffer.mesh(), entity) {
                Some(t) if t.dim() == self.dim && t.index() < layout.count(self.dim) => t,
                _ => return LocalView::invalid(),
            }
        };
        let range = layout.dof_indices(self.dim, target.index());
        let start = range.start;
        LocalView::new(target, start, &buffer.cells()[range])
    }
}

impl<M: Mesh, V: Copy, Mode: AccessMode, S: Storage<V>> fmt::Debug
    for AccessDefinition<'_, M, V, Mode, S>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessDefinition")
            .field("dim", &self.dim)
            .field("pattern", &self.pattern)
            .field("mode", &Mode::NAME)
            .finish()
    }
}

/// Cell dofs of the iterated entity.
pub fn cell<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(buffer, M::CELL_DIM, AccessPattern::Identity)
}

/// Face (dimension `CELL_DIM - 1`) dofs of the iterated entity.
pub fn face<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(buffer, M::CELL_DIM.saturating_sub(1), AccessPattern::Identity)
}

pub fn edge<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(buffer, 1, AccessPattern::Identity)
}

pub fn node<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(buffer, 0, AccessPattern::Identity)
}

/// The global block, identical for every iterated entity.
pub fn global<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(buffer, M::CELL_DIM + 1, AccessPattern::Identity)
}

/// Cell dofs of the neighbor across sub-entity `across`, or of the iterated
/// cell itself at a boundary.
pub fn neighboring_or_self<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
    across: usize,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(
        buffer,
        M::CELL_DIM,
        AccessPattern::Neighbor {
            across,
            fallback_to_self: true,
        },
    )
}

/// Cell dofs of the neighbor across sub-entity `across`; invalid at a
/// boundary.
pub fn neighboring<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
    across: usize,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(
        buffer,
        M::CELL_DIM,
        AccessPattern::Neighbor {
            across,
            fallback_to_self: false,
        },
    )
}

/// Dofs of the cell containing the iterated entity.
pub fn containing<'b, M: Mesh, V: Copy, S: Storage<V>>(
    buffer: &'b Buffer<'b, M, V, S>,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    AccessDefinition::new(buffer, M::CELL_DIM, AccessPattern::Containing)
}

pub fn read<'b, M: Mesh, V: Copy, Mode: AccessMode, S: Storage<V>>(
    def: AccessDefinition<'b, M, V, Mode, S>,
) -> AccessDefinition<'b, M, V, Read, S> {
    def.read()
}

pub fn write<'b, M: Mesh, V: Copy, Mode: AccessMode, S: Storage<V>>(
    def: AccessDefinition<'b, M, V, Mode, S>,
) -> AccessDefinition<'b, M, V, Write, S> {
    def.write()
}

pub fn read_write<'b, M: Mesh, V: Copy, Mode: AccessMode, S: Storage<V>>(
    def: AccessDefinition<'b, M, V, Mode, S>,
) -> AccessDefinition<'b, M, V, ReadWrite, S> {
    def.read_write()
}

pub fn accumulate<'b, M: Mesh, V: Copy, Mode: AccessMode, S: Storage<V>>(
    def: AccessDefinition<'b, M, V, Mode, S>,
) -> AccessDefinition<'b, M, V, Accumulate, S> {
    def.accumulate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CpuBuffer;
    use crate::topology::{GridOptions, StructuredGrid};

    fn grid() -> StructuredGrid<2> {
        StructuredGrid::try_new([3, 2], GridOptions::default()).unwrap()
    }

    #[test]
    fn cell_view_matches_layout() {
        let g = grid();
        let b = CpuBuffer::<_, f64>::try_new(&g, [0, 0, 2, 0]).unwrap();
        let e = g.entity(2, 4).unwrap();
        let v = cell(&b).project(e);
        assert!(v.is_valid());
        assert_eq!(v.len(), 2);
        assert_eq!(v.base_offset(), b.dof_indices(2, 4).start);
        v.set(1, 3.0);
        assert_eq!(b.get(b.dof_indices(2, 4).end - 1), 3.0);
    }

    #[test]
    fn adapters_keep_buffer_dim_and_pattern() {
        let g = grid();
        let b = CpuBuffer::<_, f64>::try_new(&g, [0, 0, 1, 0]).unwrap();
        let d = neighboring(&b, 3);
        let r = read(d);
        let a = accumulate(r);
        assert_eq!(r.dim(), d.dim());
        assert_eq!(a.pattern(), d.pattern());
        assert!(std::ptr::eq(a.buffer(), &b));
        assert_eq!(write(a).dim(), 2);
        assert_eq!(read_write(a).pattern(), d.pattern());
    }

    #[test]
    fn global_is_shared_by_all_entities() {
        let g = grid();
        let b = CpuBuffer::<_, i32>::try_new(&g, [1, 0, 1, 2]).unwrap();
        let gl = global(&b);
        let from_node = gl.project(g.entity(0, 5).unwrap());
        let from_cell = gl.project(g.entity(2, 0).unwrap());
        assert_eq!(from_node.len(), 2);
        assert_eq!(from_node.base_offset(), from_cell.base_offset());
        from_node.add(0, 4);
        assert_eq!(from_cell.get(0), 4);
    }

    #[test]
    fn dimension_mismatch_gives_invalid_view() {
        let g = grid();
        let b = CpuBuffer::<_, f64>::try_new(&g, [1, 0, 1, 0]).unwrap();
        // identity on a node with a cell-dimension definition
        let v = cell(&b).project(g.entity(0, 0).unwrap());
        assert!(!v.is_valid());
    }

    #[test]
    fn boundary_neighbor_is_invalid_without_fallback() {
        let g = grid();
        let b = CpuBuffer::<_, f64>::try_new(&g, [0, 0, 1, 0]).unwrap();
        let c0 = g.entity(2, 0).unwrap();
        // across 0: low side of the first axis
        assert!(!neighboring(&b, 0).project(c0).is_valid());
        let own = neighboring_or_self(&b, 0).project(c0);
        assert_eq!(own.entity(), Some(c0));
    }

    #[test]
    fn containing_exposes_parent_cell() {
        let g = grid();
        let b = CpuBuffer::<_, f64>::try_new(&g, [0, 0, 1, 0]).unwrap();
        let node = g.entity(0, 0).unwrap();
        let v = containing(&b).read().project(node);
        assert_eq!(v.entity(), Some(g.entity(2, 0).unwrap()));
    }

    #[test]
    fn face_edge_node_dimensions() {
        let g = grid();
        let b = CpuBuffer::<_, f64>::try_new(&g, [1, 1, 1, 0]).unwrap();
        assert_eq!(face(&b).dim(), 1);
        assert_eq!(edge(&b).dim(), 1);
        assert_eq!(node(&b).dim(), 0);
        assert_eq!(global(&b).dim(), 3);
    }
}
