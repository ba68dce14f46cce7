//! Step ranges for dispatcher repetition and plain counted loops.

use std::fmt;
use std::ops::{Range, RangeInclusive};

use crate::mesh_error::MeshDispatchError;

/// Step value handed to loop bodies.
pub type Step = usize;

/// Half-open range of steps `start..end` visited every `stride`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StepRange {
    start: Step,
    end: Step,
    stride: usize,
}

impl StepRange {
    /// `start..end` with stride 1. Empty when `end <= start`.
    pub const fn new(start: Step, end: Step) -> Self {
        Self {
            start,
            end,
            stride: 1,
        }
    }

    /// The single step `0`, used by [`Dispatcher::execute`](crate::dispatch::Dispatcher::execute).
    pub const fn single() -> Self {
        Self::new(0, 1)
    }

    /// Same bounds, visiting every `stride`-th step.
    pub fn with_stride(self, stride: usize) -> Result<Self, MeshDispatchError> {
        if stride == 0 {
            return Err(MeshDispatchError::ZeroStride {
                start: self.start,
                end: self.end,
            });
        }
        Ok(Self { stride, ..self })
    }

    #[inline]
    pub fn start(&self) -> Step {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Step {
        self.end
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of steps visited.
    pub fn len(&self) -> usize {
        if self.end <= self.start {
            0
        } else {
            (self.end - self.start).div_ceil(self.stride.max(1))
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn iter(&self) -> std::iter::StepBy<Range<Step>> {
        (self.start..self.end).step_by(self.stride.max(1))
    }
}

impl IntoIterator for StepRange {
    type Item = Step;
    type IntoIter = std::iter::StepBy<Range<Step>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Range<Step>> for StepRange {
    fn from(r: Range<Step>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// `a..=b` becomes `a..b + 1`; an upper bound of `usize::MAX` is clamped.
impl From<RangeInclusive<Step>> for StepRange {
    fn from(r: RangeInclusive<Step>) -> Self {
        if r.is_empty() {
            return Self::new(*r.start(), *r.start());
        }
        Self::new(*r.start(), r.end().saturating_add(1))
    }
}

/// A bare count `n` is the range `0..n`.
impl From<usize> for StepRange {
    fn from(count: usize) -> Self {
        Self::new(0, count)
    }
}

impl fmt::Display for StepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stride == 1 {
            write!(f, "{}..{}", self.start, self.end)
        } else {
            write!(f, "{}..{} by {}", self.start, self.end, self.stride)
        }
    }
}
