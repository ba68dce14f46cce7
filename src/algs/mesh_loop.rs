//! Mesh loops: an entity range, an access list and a body, run once per step.

use std::fmt;

use crate::access::list::AccessList;
use crate::algs::step_range::Step;
use crate::algs::strategy::{LoopStrategy, Serial};
use crate::mesh_error::MeshDispatchError;
use crate::topology::entity::Entity;
use crate::topology::range::EntityRange;

/// Values a loop body may return.
///
/// Bodies that cannot fail return `()`. Fallible bodies return
/// `Result<(), MeshDispatchError>`; the first error stops the loop and
/// propagates out of the dispatcher unchanged.
pub trait KernelOutcome {
    fn into_result(self) -> Result<(), MeshDispatchError>;
}

impl KernelOutcome for () {
    #[inline]
    fn into_result(self) -> Result<(), MeshDispatchError> {
        Ok(())
    }
}

impl KernelOutcome for Result<(), MeshDispatchError> {
    #[inline]
    fn into_result(self) -> Result<(), MeshDispatchError> {
        self
    }
}

/// One unit of dispatchable work: a full traversal for a given step.
pub trait Loop {
    /// Name used in logs and accelerator events.
    fn label(&self) -> &str {
        "loop"
    }

    /// Run the whole traversal once with `step`.
    fn run(&mut self, step: Step) -> Result<(), MeshDispatchError>;
}

impl<L: Loop + ?Sized> Loop for &mut L {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn run(&mut self, step: Step) -> Result<(), MeshDispatchError> {
        (**self).run(step)
    }
}

impl<L: Loop + ?Sized> Loop for Box<L> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn run(&mut self, step: Step) -> Result<(), MeshDispatchError> {
        (**self).run(step)
    }
}

/// Loop over the entities of a range.
///
/// For each entity chosen by the strategy `S`, the access list is projected
/// to local views and the body is called as `body(entity, step, views)`.
pub struct MeshLoop<'r, A, F, S = Serial> {
    range: &'r EntityRange,
    access: A,
    body: F,
    strategy: S,
    label: String,
}

impl<'r, A, F> MeshLoop<'r, A, F, Serial> {
    pub fn new<R>(range: &'r EntityRange, access: A, body: F) -> Self
    where
        A: AccessList,
        F: FnMut(Entity, Step, A::Views) -> R,
        R: KernelOutcome,
    {
        Self {
            range,
            access,
            body,
            strategy: Serial,
            label: String::from("mesh-loop"),
        }
    }
}

impl<'r, A, F, S> MeshLoop<'r, A, F, S> {
    /// Same loop under another traversal strategy.
    pub fn with_strategy<T: LoopStrategy>(self, strategy: T) -> MeshLoop<'r, A, F, T> {
        MeshLoop {
            range: self.range,
            access: self.access,
            body: self.body,
            strategy,
            label: self.label,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn range(&self) -> &'r EntityRange {
        self.range
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

impl<A, F, R, S> Loop for MeshLoop<'_, A, F, S>
where
    A: AccessList,
    F: FnMut(Entity, Step, A::Views) -> R,
    R: KernelOutcome,
    S: LoopStrategy,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn run(&mut self, step: Step) -> Result<(), MeshDispatchError> {
        let Self {
            range,
            access,
            body,
            strategy,
            ..
        } = self;
        strategy.traverse(range, &mut |entity| {
            body(entity, step, access.project(entity)).into_result()
        })
    }
}

impl<A: AccessList, F, S: fmt::Debug> fmt::Debug for MeshLoop<'_, A, F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshLoop")
            .field("label", &self.label)
            .field("dim", &self.range.dim())
            .field("entities", &self.range.len())
            .field("accesses", &self.access.len())
            .field("strategy", &self.strategy)
            .finish()
    }
}
