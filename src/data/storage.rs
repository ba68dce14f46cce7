//! Pluggable storage for buffer contents.
//!
//! This trait is the allocator seam of [`Buffer`](crate::data::buffer::Buffer):
//! it decides where the flat dof array lives. Elements are exposed as
//! `Cell<V>` so that several access definitions, possibly in several loops
//! of one dispatch, can hold the same buffer by shared reference while local
//! views read and write through it.

use core::fmt::{self, Debug};
use std::cell::Cell;

use crate::mesh_error::MeshDispatchError;

/// Contiguous, indexable storage for `V` with cell access.
pub trait Storage<V: Copy>: Debug {
    /// Construct a buffer of `len`, filled with `fill`.
    fn with_len(len: usize, fill: V) -> Self
    where
        Self: Sized;

    /// Current length in elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entire buffer as shared-mutable cells.
    fn cells(&self) -> &[Cell<V>];

    /// Copy `src` into the range `[offset .. offset + src.len())`.
    fn write_at(&self, offset: usize, src: &[V]) -> Result<(), MeshDispatchError> {
        let end =
            offset
                .checked_add(src.len())
                .ok_or(MeshDispatchError::ChunkOutOfBounds {
                    offset,
                    len: src.len(),
                })?;
        let dst = self
            .cells()
            .get(offset..end)
            .ok_or(MeshDispatchError::ChunkOutOfBounds {
                offset,
                len: src.len(),
            })?;
        for (d, &s) in dst.iter().zip(src) {
            d.set(s);
        }
        Ok(())
    }

    /// Read the range `[offset .. offset + len)` into `dst`.
    fn read_into(&self, offset: usize, len: usize, dst: &mut [V]) -> Result<(), MeshDispatchError> {
        if dst.len() != len {
            return Err(MeshDispatchError::TransferLength {
                expected: len,
                found: dst.len(),
            });
        }
        let end = offset
            .checked_add(len)
            .ok_or(MeshDispatchError::ChunkOutOfBounds { offset, len })?;
        let src = self
            .cells()
            .get(offset..end)
            .ok_or(MeshDispatchError::ChunkOutOfBounds { offset, len })?;
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s.get();
        }
        Ok(())
    }
}

/// `Vec`-backed storage (default).
pub struct VecStorage<V>(pub(crate) Vec<Cell<V>>);

impl<V: Copy> Clone for VecStorage<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<V> Debug for VecStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecStorage")
            .field("len", &self.0.len())
            .finish()
    }
}

impl<V: Copy> Storage<V> for VecStorage<V> {
    fn with_len(len: usize, fill: V) -> Self {
        Self(vec![Cell::new(fill); len])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn cells(&self) -> &[Cell<V>] {
        &self.0
    }
}

impl<V> From<Vec<V>> for VecStorage<V> {
    fn from(v: Vec<V>) -> Self {
        Self(v.into_iter().map(Cell::new).collect())
    }
}

impl<V> VecStorage<V> {
    pub fn into_inner(self) -> Vec<V> {
        self.0.into_iter().map(Cell::into_inner).collect()
    }
}
