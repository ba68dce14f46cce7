//! Access system: how a loop body sees buffers.
//!
//! An [`AccessDefinition`] names a buffer, the entity dimension whose dofs
//! are exposed, an [`AccessPattern`] and an access mode. For each iterated
//! entity a loop projects its [`AccessList`] to a tuple of [`LocalView`]s.

pub mod definition;
pub mod list;
pub mod local_view;
pub mod mode;
pub mod pattern;

pub use definition::{
    AccessDefinition, accumulate, cell, containing, edge, face, global, neighboring,
    neighboring_or_self, node, read, read_write, write,
};
pub use list::{Access, AccessList};
pub use local_view::LocalView;
pub use mode::{Accumulate, AccessMode, CanAccumulate, CanRead, CanWrite, Read, ReadWrite, Write};
pub use pattern::AccessPattern;
