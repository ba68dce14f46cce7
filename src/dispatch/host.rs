//! In-process accelerator queue.
//!
//! `HostAccelerator` runs each [`HostKernel`] at enqueue time, in submission
//! order, so it behaves like an in-order device queue whose launches finish
//! immediately. It tracks which kernels are unmapped and can record every
//! queue operation, which makes it the reference backend for testing the
//! bracketing contract of [`AcceleratorDispatcher`](super::AcceleratorDispatcher).

use std::collections::HashSet;

use crate::algs::step_range::Step;
use crate::dispatch::accelerator::{Accelerator, HostKernel};
use crate::mesh_error::MeshDispatchError;

/// Options for [`HostAccelerator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HostAcceleratorOptions {
    /// Reject unmapping an unmapped kernel and mapping a mapped one. When
    /// off, the mismatch is logged and ignored.
    pub strict_mapping: bool,
    /// Keep a log of [`QueueEvent`]s.
    pub record_events: bool,
}

impl Default for HostAcceleratorOptions {
    fn default() -> Self {
        Self {
            strict_mapping: true,
            record_events: false,
        }
    }
}

/// One queue operation, as recorded by [`HostAccelerator`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum QueueEvent {
    Unmap(String),
    SetStep { kernel: String, step: Step },
    Enqueue(String),
    Finish,
    Map(String),
}

/// In-order host queue that executes kernels as they are enqueued.
///
/// Kernels are identified by address for the duration of a run, so every
/// kernel of one run must be a distinct, non-zero-sized object.
#[derive(Debug, Default)]
pub struct HostAccelerator {
    options: HostAcceleratorOptions,
    unmapped: HashSet<usize>,
    events: Vec<QueueEvent>,
    launches: usize,
}

impl HostAccelerator {
    pub fn new(options: HostAcceleratorOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Strict accelerator that records events.
    pub fn recording() -> Self {
        Self::new(HostAcceleratorOptions {
            record_events: true,
            ..HostAcceleratorOptions::default()
        })
    }

    pub fn options(&self) -> &HostAcceleratorOptions {
        &self.options
    }

    /// Recorded events, oldest first. Empty unless `record_events` is set.
    pub fn events(&self) -> &[QueueEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.events)
    }

    /// Total kernel launches executed.
    pub fn launches(&self) -> usize {
        self.launches
    }

    /// Number of kernels currently unmapped.
    pub fn unmapped_count(&self) -> usize {
        self.unmapped.len()
    }

    fn record(&mut self, event: impl FnOnce() -> QueueEvent) {
        if self.options.record_events {
            self.events.push(event());
        }
    }

    fn mapping_violation(
        &self,
        kernel: &str,
        state: &'static str,
    ) -> Result<(), MeshDispatchError> {
        if self.options.strict_mapping {
            return Err(MeshDispatchError::MappingState {
                kernel: kernel.to_owned(),
                state,
            });
        }
        log::warn!("kernel `{kernel}` is already {state}; ignoring");
        Ok(())
    }
}

fn key<K: ?Sized>(kernel: &K) -> usize {
    std::ptr::from_ref(kernel).cast::<()>() as usize
}

impl<K: HostKernel + ?Sized> Accelerator<K> for HostAccelerator {
    fn unmap(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError> {
        if !self.unmapped.insert(key(kernel)) {
            self.mapping_violation(kernel.label(), "unmapped")?;
        }
        self.record(|| QueueEvent::Unmap(kernel.label().to_owned()));
        Ok(())
    }

    fn set_step_arg(&mut self, kernel: &mut K, step: Step) -> Result<(), MeshDispatchError> {
        kernel.set_step_arg(step);
        self.record(|| QueueEvent::SetStep {
            kernel: kernel.label().to_owned(),
            step,
        });
        Ok(())
    }

    fn enqueue(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError> {
        if !self.unmapped.contains(&key(kernel)) {
            return Err(MeshDispatchError::KernelMapped(kernel.label().to_owned()));
        }
        self.record(|| QueueEvent::Enqueue(kernel.label().to_owned()));
        log::trace!("launch `{}`", kernel.label());
        kernel.run_on_host()?;
        self.launches += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), MeshDispatchError> {
        self.record(|| QueueEvent::Finish);
        Ok(())
    }

    fn map(&mut self, kernel: &mut K) -> Result<(), MeshDispatchError> {
        if !self.unmapped.remove(&key(kernel)) {
            self.mapping_violation(kernel.label(), "mapped")?;
        }
        self.record(|| QueueEvent::Map(kernel.label().to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::accelerator::DeviceKernel;

    struct Counter {
        name: &'static str,
        step: Step,
        seen: Vec<Step>,
    }

    impl Counter {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                step: 0,
                seen: Vec::new(),
            }
        }
    }

    impl DeviceKernel for Counter {
        fn label(&self) -> &str {
            self.name
        }

        fn set_step_arg(&mut self, step: Step) {
            self.step = step;
        }
    }

    impl HostKernel for Counter {
        fn run_on_host(&mut self) -> Result<(), MeshDispatchError> {
            self.seen.push(self.step);
            Ok(())
        }
    }

    #[test]
    fn enqueue_requires_unmapped_kernel() {
        let mut acc = HostAccelerator::default();
        let mut k = Counter::new("k");
        assert_eq!(
            acc.enqueue(&mut k),
            Err(MeshDispatchError::KernelMapped("k".into()))
        );
        acc.unmap(&mut k).unwrap();
        Accelerator::<Counter>::set_step_arg(&mut acc, &mut k, 4).unwrap();
        acc.enqueue(&mut k).unwrap();
        acc.map(&mut k).unwrap();
        assert_eq!(k.seen, vec![4]);
        assert_eq!(acc.launches(), 1);
        assert_eq!(acc.unmapped_count(), 0);
    }

    #[test]
    fn strict_mapping_rejects_double_unmap() {
        let mut acc = HostAccelerator::default();
        let mut k = Counter::new("k");
        acc.unmap(&mut k).unwrap();
        assert_eq!(
            acc.unmap(&mut k),
            Err(MeshDispatchError::MappingState {
                kernel: "k".into(),
                state: "unmapped"
            })
        );
    }

    #[test]
    fn lenient_mapping_ignores_double_map() {
        let mut acc = HostAccelerator::new(HostAcceleratorOptions {
            strict_mapping: false,
            record_events: true,
        });
        let mut k = Counter::new("k");
        acc.map(&mut k).unwrap();
        assert_eq!(acc.events(), &[QueueEvent::Map("k".into())]);
    }

    #[test]
    fn events_only_when_recording() {
        let mut quiet = HostAccelerator::default();
        Accelerator::<Counter>::finish(&mut quiet).unwrap();
        assert!(quiet.events().is_empty());
        let mut loud = HostAccelerator::recording();
        Accelerator::<Counter>::finish(&mut loud).unwrap();
        assert_eq!(loud.take_events(), vec![QueueEvent::Finish]);
        assert!(loud.events().is_empty());
    }

    #[test]
    fn options_serde_defaults() {
        let o: HostAcceleratorOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(o, HostAcceleratorOptions::default());
        let o: HostAcceleratorOptions =
            serde_json::from_str(r#"{"record_events":true}"#).unwrap();
        assert!(o.strict_mapping && o.record_events);
    }
}
