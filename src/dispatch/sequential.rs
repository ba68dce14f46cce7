//! Sequential dispatch on the calling thread.

use crate::algs::mesh_loop::Loop;
use crate::algs::step_range::{Step, StepRange};
use crate::dispatch::Dispatcher;
use crate::mesh_error::MeshDispatchError;

/// Ordered collection of loops run together for each step.
///
/// Implemented for tuples of up to eight loops, mutable slices and vectors.
/// Loops can be passed by value or as `&mut` so they can be reused across
/// calls.
pub trait LoopSet {
    /// Number of loops.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every loop once for `step`, in order.
    fn run_step(&mut self, step: Step) -> Result<(), MeshDispatchError>;
}

macro_rules! tuple_loop_set {
    ($len:literal; $($name:ident),+) => {
        impl<$($name: Loop),+> LoopSet for ($($name,)+) {
            fn len(&self) -> usize {
                $len
            }

            #[allow(non_snake_case)]
            fn run_step(&mut self, step: Step) -> Result<(), MeshDispatchError> {
                let ($($name,)+) = self;
                $($name.run(step)?;)+
                Ok(())
            }
        }
    };
}

tuple_loop_set!(1; A);
tuple_loop_set!(2; A, B);
tuple_loop_set!(3; A, B, C);
tuple_loop_set!(4; A, B, C, D);
tuple_loop_set!(5; A, B, C, D, E);
tuple_loop_set!(6; A, B, C, D, E, F);
tuple_loop_set!(7; A, B, C, D, E, F, G);
tuple_loop_set!(8; A, B, C, D, E, F, G, H);

impl<L: Loop> LoopSet for &mut [L] {
    fn len(&self) -> usize {
        <[L]>::len(self)
    }

    fn run_step(&mut self, step: Step) -> Result<(), MeshDispatchError> {
        self.iter_mut().try_for_each(|l| l.run(step))
    }
}

impl<L: Loop> LoopSet for Vec<L> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn run_step(&mut self, step: Step) -> Result<(), MeshDispatchError> {
        self.iter_mut().try_for_each(|l| l.run(step))
    }
}

/// Direct, single-threaded, synchronous dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequentialDispatcher;

impl<W: LoopSet> Dispatcher<W> for SequentialDispatcher {
    fn execute_steps<R: Into<StepRange>>(
        &mut self,
        steps: R,
        mut work: W,
    ) -> Result<(), MeshDispatchError> {
        let steps = steps.into();
        log::debug!(
            "sequential dispatch: {} loop(s) over steps {steps}",
            work.len()
        );
        for step in steps {
            log::trace!("step {step}");
            work.run_step(step)?;
        }
        Ok(())
    }
}
