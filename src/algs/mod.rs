//! Mesh loops, loop strategies and step ranges.

pub mod for_each;
pub mod mesh_loop;
pub mod step_range;
pub mod strategy;

pub use for_each::{for_each, for_each_entity, for_each_sub_entity};
pub use mesh_loop::{KernelOutcome, Loop, MeshLoop};
pub use step_range::{Step, StepRange};
pub use strategy::{LoopStrategy, PartitionLocal, Serial};
