//! `EntityRange`: the entities of one dimension, grouped by partition.
//!
//! A range is what a mesh hands to a mesh loop. Iteration visits partitions in
//! ascending order and, within a partition, indices in stored order. That
//! order is deterministic for a fixed range but is not required to be index
//! order once a mesh has been partitioned.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshDispatchError;
use crate::topology::entity::Entity;
use std::collections::HashSet;

/// Entities of a single dimension, grouped by partition.
///
/// # Invariants
///
/// - At least one partition exists (possibly empty).
/// - An index appears at most once across all partitions.
/// - `len` equals the total number of stored indices.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EntityRange {
    dim: usize,
    partitions: Vec<Vec<usize>>,
    len: usize,
}

impl EntityRange {
    /// Single-partition range over `indices`, visited in the given order.
    pub fn from_indices(
        dim: usize,
        indices: impl IntoIterator<Item = usize>,
    ) -> Result<Self, MeshDispatchError> {
        Self::from_partitions(dim, vec![indices.into_iter().collect()])
    }

    /// Range with one index list per partition.
    ///
    /// # Errors
    /// Returns `Err(DuplicateEntity)` if an index is listed twice.
    pub fn from_partitions(
        dim: usize,
        mut partitions: Vec<Vec<usize>>,
    ) -> Result<Self, MeshDispatchError> {
        if partitions.is_empty() {
            partitions.push(Vec::new());
        }
        let len = partitions.iter().map(Vec::len).sum();
        let range = EntityRange {
            dim,
            partitions,
            len,
        };
        range.validate_invariants()?;
        Ok(range)
    }

    /// Dimension of every entity in the range.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Total number of entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of partitions (at least one).
    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Entity indices owned by `partition`.
    pub fn indices(&self, partition: usize) -> Result<&[usize], MeshDispatchError> {
        self.partitions
            .get(partition)
            .map(Vec::as_slice)
            .ok_or(MeshDispatchError::PartitionOutOfRange {
                partition,
                count: self.partitions.len(),
            })
    }

    /// Entities owned by `partition`, in stored order.
    pub fn entities(
        &self,
        partition: usize,
    ) -> Result<impl Iterator<Item = Entity> + '_, MeshDispatchError> {
        let dim = self.dim;
        Ok(self
            .indices(partition)?
            .iter()
            .map(move |&i| Entity::new(dim, i, partition)))
    }

    /// All entities, partition by partition.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        let dim = self.dim;
        self.partitions
            .iter()
            .enumerate()
            .flat_map(move |(p, idx)| idx.iter().map(move |&i| Entity::new(dim, i, p)))
    }
}

impl DebugInvariants for EntityRange {
    fn validate_invariants(&self) -> Result<(), MeshDispatchError> {
        let mut seen = HashSet::with_capacity(self.len);
        for &i in self.partitions.iter().flatten() {
            if !seen.insert(i) {
                return Err(MeshDispatchError::DuplicateEntity {
                    dimension: self.dim,
                    index: i,
                });
            }
        }
        let stored: usize = self.partitions.iter().map(Vec::len).sum();
        if stored != self.len {
            return Err(MeshDispatchError::RangeLength {
                expected: stored,
                found: self.len,
            });
        }
        Ok(())
    }
}
