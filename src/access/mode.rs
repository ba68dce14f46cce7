//! Access modes: what a kernel may do with a local view.
//!
//! Modes are zero-sized marker types. A [`LocalView`](super::LocalView)
//! exposes methods according to the capability traits its mode implements:
//!
//! | mode        | `get` | `set` | `add` |
//! |-------------|:-----:|:-----:|:-----:|
//! | `Read`      |   ✓   |       |       |
//! | `Write`     |       |   ✓   |       |
//! | `ReadWrite` |   ✓   |   ✓   |   ✓   |
//! | `Accumulate`|       |       |   ✓   |
//!
//! `Write` views start from contents the kernel must treat as undefined, so
//! they cannot be read. `Accumulate` kernels add into existing contents; that
//! they never overwrite is a documented contract, not a runtime check.

use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}
}

/// Closed set of access modes.
pub trait AccessMode: sealed::Sealed + Copy + Default + Debug + 'static {
    /// Short lowercase name, used in logs.
    const NAME: &'static str;
    /// Whether views of this mode can change buffer contents.
    const MUTABLE: bool;
}

/// Modes whose views can be read.
pub trait CanRead: AccessMode {}
/// Modes whose views can be overwritten.
pub trait CanWrite: AccessMode {}
/// Modes whose views can be added into.
pub trait CanAccumulate: AccessMode {}

/// Immutable access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Read;

/// Overwrite-only access; prior contents are undefined to the kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Write;

/// Read and write access; prior contents are valid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ReadWrite;

/// Add-into access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Accumulate;

macro_rules! access_mode {
    ($ty:ident, $name:literal, $mutable:literal $(, $cap:ident)*) => {
        impl sealed::Sealed for $ty {}
        impl AccessMode for $ty {
            const NAME: &'static str = $name;
            const MUTABLE: bool = $mutable;
        }
        $(impl $cap for $ty {})*
    };
}

access_mode!(Read, "read", false, CanRead);
access_mode!(Write, "write", true, CanWrite);
access_mode!(ReadWrite, "read-write", true, CanRead, CanWrite, CanAccumulate);
access_mode!(Accumulate, "accumulate", true, CanAccumulate);
