//! Data module: dof layout, storage and buffers

pub mod buffer;
pub mod dof_layout;
pub mod storage;

pub use buffer::{Buffer, DofRange};
pub use dof_layout::DofLayout;
pub use storage::{Storage, VecStorage};

/// Alias for the common Vec-backed buffer.
pub type CpuBuffer<'m, M, V> = buffer::Buffer<'m, M, V, VecStorage<V>>;
