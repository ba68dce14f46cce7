//! Loop strategies: how a mesh loop walks its entity range.
//!
//! The dispatcher only sees [`Loop`](super::mesh_loop::Loop); the traversal
//! order of entities inside one loop is decided here. Both strategies are
//! deterministic for a fixed range.

use crate::mesh_error::MeshDispatchError;
use crate::topology::entity::Entity;
use crate::topology::range::EntityRange;

/// Visitor called once per traversed entity.
pub type Visit<'v> = dyn FnMut(Entity) -> Result<(), MeshDispatchError> + 'v;

/// Traversal of an [`EntityRange`]. The first visitor error stops the walk
/// and is returned.
pub trait LoopStrategy {
    fn traverse(&self, range: &EntityRange, visit: &mut Visit<'_>) -> Result<(), MeshDispatchError>;
}

/// Every partition of the range in order, each in stored order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Serial;

impl LoopStrategy for Serial {
    fn traverse(
        &self,
        range: &EntityRange,
        visit: &mut Visit<'_>,
    ) -> Result<(), MeshDispatchError> {
        for e in range.iter() {
            visit(e)?;
        }
        Ok(())
    }
}

/// Only the entities of one partition, e.g. the rank-local part of a
/// distributed range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartitionLocal {
    pub partition: usize,
}

impl PartitionLocal {
    pub fn new(partition: usize) -> Self {
        Self { partition }
    }
}

impl LoopStrategy for PartitionLocal {
    fn traverse(
        &self,
        range: &EntityRange,
        visit: &mut Visit<'_>,
    ) -> Result<(), MeshDispatchError> {
        for e in range.entities(self.partition)? {
            visit(e)?;
        }
        Ok(())
    }
}
