#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-dispatch
//!
//! mesh-dispatch is the data-layout and execution core of a mesh-based
//! simulation framework. It stores per-entity degrees of freedom (dofs) in
//! flat typed buffers, gives loop bodies safe per-entity views into those
//! buffers, and runs loops over entity ranges through interchangeable
//! dispatch strategies.
//!
//! ## Features
//! - [`DofLayout`](data::DofLayout): block offsets for a per-dimension dof
//!   specification, computed once per buffer
//! - [`Buffer`](data::Buffer) over a pluggable [`Storage`](data::Storage)
//! - Access definitions with patterns (identity, neighbor, containing cell)
//!   and type-level access modes (`Read`, `Write`, `ReadWrite`,
//!   `Accumulate`)
//! - [`MeshLoop`](algs::MeshLoop) with serial and partition-local strategies
//! - Sequential and accelerator [`Dispatcher`](dispatch::Dispatcher)s with a
//!   fixed step/loop/entity ordering contract
//! - [`StructuredGrid`](topology::StructuredGrid), a Cartesian mesh for
//!   tests, benches and small drivers
//!
//! ## Usage
//!
//! ```rust
//! # fn try_main() -> Result<(), mesh_dispatch::mesh_error::MeshDispatchError> {
//! use mesh_dispatch::prelude::*;
//!
//! let grid = StructuredGrid::try_new([10, 10, 10], GridOptions::default())?;
//! // one dof per cell; nodes, edges, faces and global get none
//! let u = CpuBuffer::<_, f64>::try_new(&grid, [0, 0, 0, 1, 0])?;
//! let cells = grid.entity_range(3)?;
//!
//! let mut init = for_each_entity(&cells, (cell(&u).write(),), |_, _, (v,)| v.set(0, 1.0));
//! let mut step = for_each_entity(&cells, (cell(&u).read_write(),), |_, step, (v,)| {
//!     v.set(0, v.get(0) + step as f64)
//! });
//! SequentialDispatcher.execute((&mut init,))?;
//! SequentialDispatcher.execute_steps(1..=3, (&mut step,))?;
//! assert!(u.partition_values(3).iter().all(|&x| x == 7.0));
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```
//!
//! ## Invariant checks
//! Layout and range invariants are asserted in debug builds; enable the
//! `check-invariants` feature to keep them in release builds.

pub mod access;
pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod dispatch;
pub mod mesh_error;
pub mod topology;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::access::{
        Access, AccessDefinition, AccessList, AccessPattern, Accumulate, LocalView, Read,
        ReadWrite, Write, accumulate, cell, containing, edge, face, global, neighboring,
        neighboring_or_self, node, read, read_write, write,
    };
    pub use crate::algs::{
        KernelOutcome, Loop, MeshLoop, PartitionLocal, Serial, Step, StepRange, for_each,
        for_each_entity, for_each_sub_entity,
    };
    pub use crate::data::{Buffer, CpuBuffer, DofLayout, Storage, VecStorage};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::dispatch::{
        Accelerator, AcceleratorDispatcher, DeviceKernel, Dispatcher, HostAccelerator,
        HostAcceleratorOptions, HostKernel, KernelSet, LoopSet, OffloadedLoop,
        SequentialDispatcher,
    };
    pub use crate::mesh_error::MeshDispatchError;
    pub use crate::topology::{Entity, EntityRange, GridOptions, Mesh, StructuredGrid};
}
