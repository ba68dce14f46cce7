//! Structural invariant checks.
//!
//! [`DofLayout`](crate::data::DofLayout) and
//! [`EntityRange`](crate::topology::EntityRange) validate themselves on
//! construction. `validate_invariants` always runs and reports the first
//! violation; `debug_assert_invariants` panics on it, but only in debug builds
//! or with the `check-invariants` feature.

use crate::mesh_error::MeshDispatchError;

/// Self-validation for types with structural invariants.
pub trait DebugInvariants {
    /// Check every invariant, returning the first violation.
    fn validate_invariants(&self) -> Result<(), MeshDispatchError>;

    /// Panic on the first violation when invariant checks are compiled in.
    #[inline]
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), std::any::type_name::<Self>());
    }
}

/// Panics with `context` if the fallible check `expr` fails, when invariant
/// checks are compiled in; otherwise `expr` is not evaluated.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $context:expr) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!("[invariants] {}: {}", $context, e);
        }
    };
}
