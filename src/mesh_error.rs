//! MeshDispatchError: Unified error type for mesh-dispatch public APIs
//!
//! Every fallible operation in the crate (layout construction, storage
//! transfers, grid construction, loop bodies and accelerator queues) reports
//! through this type so failures surface unchanged at the caller of
//! [`Dispatcher::execute`](crate::dispatch::Dispatcher::execute).

use thiserror::Error;

/// Unified error type for mesh-dispatch operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshDispatchError {
    /// A dof specification does not have `cell_dim + 2` entries.
    #[error("dof specification has {found} entries, expected {expected}")]
    DofSpecLength { expected: usize, found: usize },
    /// A dimension outside `0..=global_dim` was requested.
    #[error("dimension {dimension} is out of range (max {max})")]
    InvalidDimension { dimension: usize, max: usize },
    /// An entity index is past the number of entities in its dimension.
    #[error("entity {index} of dimension {dimension} is out of range ({count} entities)")]
    EntityOutOfRange {
        dimension: usize,
        index: usize,
        count: usize,
    },
    /// A partition index is past the number of partitions of a range.
    #[error("partition {partition} is out of range ({count} partitions)")]
    PartitionOutOfRange { partition: usize, count: usize },
    /// The total storage size does not fit in `usize`.
    #[error("dof layout overflows usize at dimension {dimension}")]
    LayoutOverflow { dimension: usize },
    /// Stored offsets disagree with the offsets implied by the dof counts.
    #[error("dof layout invalid at dimension {dimension}: offset {found}, expected {expected}")]
    LayoutMismatch {
        dimension: usize,
        expected: usize,
        found: usize,
    },
    /// Grid construction parameters are unusable.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A step range was built with a zero stride.
    #[error("step range {start}..{end} has zero stride")]
    ZeroStride { start: usize, end: usize },
    /// The stored total length disagrees with the sum of the blocks.
    #[error("dof layout total length is {found}, blocks sum to {expected}")]
    LayoutLength { expected: usize, found: usize },
    /// An entity index appears twice in one entity range.
    #[error("entity {index} of dimension {dimension} appears more than once in the range")]
    DuplicateEntity { dimension: usize, index: usize },
    /// The stored entity count of a range disagrees with its partitions.
    #[error("entity range records {found} entities, partitions hold {expected}")]
    RangeLength { expected: usize, found: usize },
    /// A chunk `[offset, offset + len)` does not fit in the storage.
    #[error("storage chunk at offset {offset} with length {len} is out of bounds")]
    ChunkOutOfBounds { offset: usize, len: usize },
    /// A bulk transfer slice has the wrong length.
    #[error("bulk transfer length mismatch: expected {expected}, found {found}")]
    TransferLength { expected: usize, found: usize },
    /// A loop body reported a failure.
    #[error("kernel `{kernel}` failed: {message}")]
    KernelFailed { kernel: String, message: String },
    /// A kernel was enqueued while its buffers were still mapped on the host.
    #[error("kernel `{0}` is mapped on the host and cannot be enqueued")]
    KernelMapped(String),
    /// A kernel was mapped or unmapped twice in a row.
    #[error("kernel `{kernel}` is already {state}")]
    MappingState { kernel: String, state: &'static str },
}

impl MeshDispatchError {
    /// Convenience constructor for failures raised inside a loop body.
    pub fn kernel(kernel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::KernelFailed {
            kernel: kernel.into(),
            message: message.into(),
        }
    }
}
