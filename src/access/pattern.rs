//! Access patterns: which entity's dofs a view exposes for an iterated entity.

use crate::topology::entity::Entity;
use crate::topology::mesh::Mesh;

/// Maps the iterated entity to the entity whose dofs are exposed.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum AccessPattern {
    /// The iterated entity itself.
    #[default]
    Identity,
    /// The same-dimension entity across the `across`-th sub-entity. At a
    /// boundary, the iterated entity itself when `fallback_to_self` is set,
    /// otherwise nothing.
    Neighbor {
        across: usize,
        fallback_to_self: bool,
    },
    /// The cell containing the iterated entity, e.g. the parent of a face.
    Containing,
}

impl AccessPattern {
    /// Entity exposed for `entity`, or `None` when the pattern cannot
    /// resolve.
    #[inline]
    pub fn resolve<M: Mesh>(&self, mesh: &M, entity: Entity) -> Option<Entity> {
        match *self {
            AccessPattern::Identity => Some(entity),
            AccessPattern::Neighbor {
                across,
                fallback_to_self,
            } => mesh
                .neighbor(entity, across)
                .or_else(|| fallback_to_self.then_some(entity)),
            AccessPattern::Containing => mesh.containing_cell(entity),
        }
    }
}
