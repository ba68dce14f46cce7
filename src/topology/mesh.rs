//! The mesh contract consumed by the dof layout, access patterns and loops.
//!
//! Mesh construction, geometry and partitioning live outside this crate; the
//! core only needs entity counts, ranges and a handful of adjacency queries.
//! [`StructuredGrid`](crate::topology::structured::StructuredGrid) is the
//! in-crate implementation.

use crate::mesh_error::MeshDispatchError;
use crate::topology::entity::Entity;
use crate::topology::range::EntityRange;
use std::fmt::Debug;

/// Per-dimension dof counts: one entry per entity dimension `0..=CELL_DIM`
/// followed by one trailing entry for the global block.
///
/// Implemented for fixed-size arrays so that the length is part of the type:
/// a mesh names its specification type as `[usize; CELL_DIM + 2]` and a
/// specification of any other length is rejected by the compiler.
pub trait DofSpec: Copy + Debug + AsRef<[usize]> {
    /// Number of entries (`CELL_DIM + 2`).
    const LEN: usize;

    /// Entries as a slice, node count first, global count last.
    #[inline]
    fn counts(&self) -> &[usize] {
        self.as_ref()
    }
}

impl<const N: usize> DofSpec for [usize; N] {
    const LEN: usize = N;
}

/// Topology queries required from a mesh.
///
/// Dimensions run from `0` (nodes) to [`CELL_DIM`](Mesh::CELL_DIM) (cells).
/// Entity indices within a dimension are dense, `0..num_entities(dim)`.
pub trait Mesh {
    /// Topological dimension of the cells.
    const CELL_DIM: usize;

    /// Dof specification accepted by buffers on this mesh; must be
    /// `[usize; CELL_DIM + 2]`.
    type Dofs: DofSpec;

    /// Number of entities of dimension `dim`; `0` for `dim > CELL_DIM`.
    fn num_entities(&self, dim: usize) -> usize;

    /// Number of partitions entity ranges are split into.
    fn num_partitions(&self) -> usize {
        1
    }

    /// Partition that owns entity `index` of dimension `dim`.
    fn partition_of(&self, _dim: usize, _index: usize) -> usize {
        0
    }

    /// Handle for entity `index` of dimension `dim`.
    fn entity(&self, dim: usize, index: usize) -> Result<Entity, MeshDispatchError> {
        if dim > Self::CELL_DIM {
            return Err(MeshDispatchError::InvalidDimension {
                dimension: dim,
                max: Self::CELL_DIM,
            });
        }
        let count = self.num_entities(dim);
        if index >= count {
            return Err(MeshDispatchError::EntityOutOfRange {
                dimension: dim,
                index,
                count,
            });
        }
        Ok(Entity::new(dim, index, self.partition_of(dim, index)))
    }

    /// Handles for an explicit list of entity indices, in the given order.
    fn entities(&self, dim: usize, indices: &[usize]) -> Result<Vec<Entity>, MeshDispatchError> {
        indices.iter().map(|&i| self.entity(dim, i)).collect()
    }

    /// All entities of dimension `dim`, grouped by partition.
    fn entity_range(&self, dim: usize) -> Result<EntityRange, MeshDispatchError> {
        if dim > Self::CELL_DIM {
            return Err(MeshDispatchError::InvalidDimension {
                dimension: dim,
                max: Self::CELL_DIM,
            });
        }
        let mut parts = vec![Vec::new(); self.num_partitions().max(1)];
        for index in 0..self.num_entities(dim) {
            parts[self.partition_of(dim, index)].push(index);
        }
        EntityRange::from_partitions(dim, parts)
    }

    /// Direct topological children of `entity` (dimension `dim - 1`), in a
    /// fixed local order. Empty for nodes.
    fn sub_entities(&self, entity: Entity) -> Vec<Entity>;

    /// Same-dimension entity sharing the `across`-th sub-entity of `entity`,
    /// or `None` at the boundary.
    fn neighbor(&self, entity: Entity, across: usize) -> Option<Entity>;

    /// Lowest-index cell whose closure contains `entity`; a cell contains
    /// itself.
    fn containing_cell(&self, entity: Entity) -> Option<Entity>;

    /// Whether the `across`-th sub-entity of `entity` lies on the boundary.
    fn is_boundary(&self, entity: Entity, across: usize) -> bool {
        self.neighbor(entity, across).is_none()
    }
}
