//! Accelerator dispatch: kernels handed to an asynchronous queue.
//!
//! The dispatcher does no numeric work itself. It only fixes the order of
//! queue operations:
//!
//! 1. unmap every kernel (host mappings released),
//! 2. for each step, for each kernel: set the step argument, then enqueue,
//! 3. finish the queue,
//! 4. map every kernel (host mappings reacquired).
//!
//! Host memory written by the kernels must not be read before step 4. A
//! failing step stops further launches, but the queue is still finished and
//! every unmapped kernel is mapped again before the first error is returned,
//! so the next run starts from a clean state.

use crate::algs::mesh_loop::Loop;
use crate::algs::step_range::{Step, StepRange};
use crate::dispatch::Dispatcher;
use crate::mesh_error::MeshDispatchError;

/// A kernel as seen by a device queue.
pub trait DeviceKernel {
    /// Name used in queue events and errors.
    fn label(&self) -> &str;

    /// Update the step argument passed on the next launch.
    fn set_step_arg(&mut self, step: Step);
}

/// A kernel that can also run in-process, used by
/// [`HostAccelerator`](crate::dispatch::HostAccelerator).
pub trait HostKernel: DeviceKernel {
    fn run_on_host(&mut self) -> Result<(), MeshDispatchError>;
}

impl<K: DeviceKernel + ?Sized> DeviceKernel for &mut K {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn set_step_arg(&mut self, step: Step) {
        (**self).set_step_arg(step)
    }
}

impl<K: HostKernel + ?Sized> HostKernel for &mut K {
    fn run_on_host(&mut self) -> Result<(), MeshDispatchError> {
        (**self).run_on_host()
    }
}

impl<K: DeviceKernel + ?Sized> DeviceKernel for Box<K> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn set_step_arg(&mut self, step: Step) {
        (**self).set_step_arg(step)
    }
}

impl<K: HostKernel + ?Sized> HostKernel for Box<K> {
    fn run_on_host(&mut self) -> Result<(), MeshDispatchError> {
        (**self).run_on_host()
    }
}

/// Kernel-execution facility driven by [`AcceleratorDispatcher`].
pub trait Accelerator<K: DeviceKernel + ?Sized> {
    /// Release the host mapping of `kernel`'s buffers.
    fn unmap(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError>;

    /// Set the step argument of `kernel` before it is enqueued.
    fn set_step_arg(&mut self, kernel: &mut K, step: Step) -> Result<(), MeshDispatchError> {
        kernel.set_step_arg(step);
        Ok(())
    }

    /// Submit one launch of `kernel`.
    fn enqueue(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError>;

    /// Block until every submitted launch completed.
    fn finish(&mut self) -> Result<(), MeshDispatchError>;

    /// Reacquire the host mapping of `kernel`'s buffers.
    fn map(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError>;
}

/// Ordered kernels participating in one accelerator run.
pub trait KernelSet {
    type Kernel: DeviceKernel + ?Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to each kernel in order, stopping at the first error.
    fn try_for_each(
        &mut self,
        f: &mut dyn FnMut(&mut Self::Kernel) -> Result<(), MeshDispatchError>,
    ) -> Result<(), MeshDispatchError>;
}

impl<K: DeviceKernel + ?Sized> KernelSet for &mut [&mut K] {
    type Kernel = K;

    fn len(&self) -> usize {
        <[&mut K]>::len(self)
    }

    fn try_for_each(
        &mut self,
        f: &mut dyn FnMut(&mut K) -> Result<(), MeshDispatchError>,
    ) -> Result<(), MeshDispatchError> {
        self.iter_mut().try_for_each(|k| f(&mut **k))
    }
}

impl<K: DeviceKernel> KernelSet for &mut Vec<K> {
    type Kernel = K;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn try_for_each(
        &mut self,
        f: &mut dyn FnMut(&mut K) -> Result<(), MeshDispatchError>,
    ) -> Result<(), MeshDispatchError> {
        self.iter_mut().try_for_each(f)
    }
}

/// Dispatch through an [`Accelerator`] queue.
#[derive(Debug, Default)]
pub struct AcceleratorDispatcher<A> {
    accelerator: A,
}

impl<A> AcceleratorDispatcher<A> {
    pub fn new(accelerator: A) -> Self {
        Self { accelerator }
    }

    pub fn accelerator(&self) -> &A {
        &self.accelerator
    }

    pub fn accelerator_mut(&mut self) -> &mut A {
        &mut self.accelerator
    }

    pub fn into_inner(self) -> A {
        self.accelerator
    }
}

impl<A, W> Dispatcher<W> for AcceleratorDispatcher<A>
where
    W: KernelSet,
    A: Accelerator<W::Kernel>,
{
    fn execute_steps<R: Into<StepRange>>(
        &mut self,
        steps: R,
        mut work: W,
    ) -> Result<(), MeshDispatchError> {
        let steps = steps.into();
        let acc = &mut self.accelerator;
        log::debug!(
            "accelerator dispatch: {} kernel(s) over steps {steps}",
            work.len()
        );
        let mut unmapped = 0usize;
        let mut outcome = work.try_for_each(&mut |k| {
            acc.unmap(k)?;
            unmapped += 1;
            Ok(())
        });
        if outcome.is_ok() {
            outcome = steps.iter().try_for_each(|step| {
                log::trace!("enqueue step {step}");
                work.try_for_each(&mut |k| {
                    acc.set_step_arg(k, step)?;
                    acc.enqueue(k)
                })
            });
            let drained = acc.finish();
            outcome = outcome.and(drained);
        }
        if let Err(e) = &outcome {
            log::debug!("accelerator dispatch failed: {e}; remapping {unmapped} kernel(s)");
        }

        // Every kernel unmapped above is mapped again, even after a failure.
        let mut remaining = unmapped;
        let mut first_map_err = None;
        work.try_for_each(&mut |k| {
            if remaining > 0 {
                remaining -= 1;
                if let Err(e) = acc.map(k) {
                    first_map_err.get_or_insert(e);
                }
            }
            Ok(())
        })?;
        outcome?;
        first_map_err.map_or(Ok(()), Err)
    }
}

/// Runs a [`Loop`] as a host kernel: the step argument is stored until the
/// launch.
#[derive(Debug)]
pub struct OffloadedLoop<L> {
    inner: L,
    step: Step,
}

impl<L: Loop> OffloadedLoop<L> {
    pub fn new(inner: L) -> Self {
        Self { inner, step: 0 }
    }

    /// Step passed to the next launch.
    pub fn step(&self) -> Step {
        self.step
    }

    pub fn into_inner(self) -> L {
        self.inner
    }
}

impl<L: Loop> DeviceKernel for OffloadedLoop<L> {
    fn label(&self) -> &str {
        self.inner.label()
    }

    fn set_step_arg(&mut self, step: Step) {
        self.step = step;
    }
}

impl<L: Loop> HostKernel for OffloadedLoop<L> {
    fn run_on_host(&mut self) -> Result<(), MeshDispatchError> {
        self.inner.run(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accelerator that records the call order without running anything.
    /// An optional `(operation, label)` pair is rejected.
    #[derive(Default)]
    struct Trace(Vec<String>, Option<(&'static str, &'static str)>);

    impl Trace {
        fn failing_on(op: &'static str, label: &'static str) -> Self {
            Trace(Vec::new(), Some((op, label)))
        }

        fn check(&self, op: &str, label: &str) -> Result<(), MeshDispatchError> {
            if self.1.is_some_and(|(o, l)| o == op && l == label) {
                return Err(MeshDispatchError::kernel(label, op));
            }
            Ok(())
        }
    }

    impl<K: DeviceKernel + ?Sized> Accelerator<K> for Trace {
        fn unmap(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError> {
            self.check("unmap", kernel.label())?;
            self.0.push(format!("unmap {}", kernel.label()));
            Ok(())
        }

        fn enqueue(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError> {
            self.check("enqueue", kernel.label())?;
            self.0.push(format!("enqueue {}", kernel.label()));
            Ok(())
        }

        fn finish(&mut self) -> Result<(), MeshDispatchError> {
            self.0.push("finish".into());
            Ok(())
        }

        fn map(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError> {
            self.0.push(format!("map {}", kernel.label()));
            Ok(())
        }
    }

    struct Named(&'static str, Vec<Step>);

    impl DeviceKernel for Named {
        fn label(&self) -> &str {
            self.0
        }

        fn set_step_arg(&mut self, step: Step) {
            self.1.push(step);
        }
    }

    #[test]
    fn brackets_steps_with_unmap_and_map() {
        let mut a = Named("a", Vec::new());
        let mut b = Named("b", Vec::new());
        let mut d = AcceleratorDispatcher::new(Trace::default());
        d.execute_steps(1..3, &mut [&mut a, &mut b][..]).unwrap();
        assert_eq!(
            d.into_inner().0,
            vec![
                "unmap a", "unmap b", "enqueue a", "enqueue b", "enqueue a", "enqueue b",
                "finish", "map a", "map b"
            ]
        );
        assert_eq!(a.1, vec![1, 2]);
        assert_eq!(b.1, vec![1, 2]);
    }

    #[test]
    fn owned_kernels_through_vec() {
        let mut ks = vec![Named("k", Vec::new())];
        let mut d = AcceleratorDispatcher::new(Trace::default());
        d.execute(&mut ks).unwrap();
        assert_eq!(ks[0].1, vec![0]);
        assert_eq!(d.accelerator().0.len(), 4);
    }

    #[test]
    fn failed_unmap_remaps_only_unmapped_kernels() {
        let mut a = Named("a", Vec::new());
        let mut b = Named("b", Vec::new());
        let mut c = Named("c", Vec::new());
        let mut d = AcceleratorDispatcher::new(Trace::failing_on("unmap", "b"));
        let err = d
            .execute(&mut [&mut a, &mut b, &mut c][..])
            .unwrap_err();
        assert_eq!(err, MeshDispatchError::kernel("b", "unmap"));
        assert_eq!(d.into_inner().0, vec!["unmap a", "map a"]);
        assert!(a.1.is_empty());
    }

    #[test]
    fn failed_enqueue_still_finishes_and_maps() {
        let mut a = Named("a", Vec::new());
        let mut b = Named("b", Vec::new());
        let mut d = AcceleratorDispatcher::new(Trace::failing_on("enqueue", "b"));
        let err = d
            .execute_steps(0..2, &mut [&mut a, &mut b][..])
            .unwrap_err();
        assert_eq!(err, MeshDispatchError::kernel("b", "enqueue"));
        assert_eq!(
            d.into_inner().0,
            vec!["unmap a", "unmap b", "enqueue a", "finish", "map a", "map b"]
        );
        assert_eq!(b.1, vec![0]);
    }
}
