//! Top-level module for the mesh contract.
//!
//! This module provides the types the core consumes from a mesh:
//! - [`Entity`] handles identifying one entity by dimension, index and partition
//! - The [`Mesh`] trait: entity counts, ranges and adjacency queries
//! - [`EntityRange`]: the entities of one dimension grouped by partition
//! - [`StructuredGrid`]: Cartesian grids implementing [`Mesh`]

pub mod entity;
pub mod mesh;
pub mod range;
pub mod structured;

pub use entity::Entity;
pub use mesh::{DofSpec, Mesh};
pub use range::EntityRange;
pub use structured::{GridOptions, StructuredGrid};
