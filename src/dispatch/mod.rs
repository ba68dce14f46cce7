//! Dispatchers: run mesh loops over a step range.
//!
//! Two interchangeable strategies share the [`Dispatcher`] contract:
//!
//! - [`SequentialDispatcher`] calls loops directly on the current thread. For
//!   each step in order, each loop in argument order performs its full
//!   traversal in range order.
//! - [`AcceleratorDispatcher`] hands kernels to an [`Accelerator`] queue,
//!   bracketing the step loop with unmap/map so host memory is only touched
//!   after the matching map.
//!
//! A dispatcher keeps no state between calls; every `execute*` call is a
//! complete, independent run. Errors from loop bodies or kernel enqueues
//! stop the run and are returned unchanged.

pub mod accelerator;
pub mod host;
pub mod sequential;

pub use accelerator::{
    Accelerator, AcceleratorDispatcher, DeviceKernel, HostKernel, KernelSet, OffloadedLoop,
};
pub use host::{HostAccelerator, HostAcceleratorOptions, QueueEvent};
pub use sequential::{LoopSet, SequentialDispatcher};

use crate::algs::step_range::StepRange;
use crate::mesh_error::MeshDispatchError;

/// Execution strategy for a unit of work `W` (a set of loops or kernels).
pub trait Dispatcher<W> {
    /// Run `work` once for every step of `steps`.
    fn execute_steps<R: Into<StepRange>>(
        &mut self,
        steps: R,
        work: W,
    ) -> Result<(), MeshDispatchError>;

    /// Run `work` for the single step `0`.
    fn execute(&mut self, work: W) -> Result<(), MeshDispatchError> {
        self.execute_steps(StepRange::single(), work)
    }
}
