//! Generation-tagged byte ranges.
//!
//! A [`BufferRange`] is an offset pair into a backing store plus the
//! arena generation it was committed in. Offsets alone cannot tell a
//! retained range from a later allocation that landed on the same bytes;
//! the generation makes that distinction O(1).

use std::fmt;

use reel_core::Generation;

/// Half-open byte range `[start, end)` committed in a given generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct BufferRange {
    pub(crate) start: u32,
    pub(crate) end: u32,
    pub(crate) generation: Generation,
}

impl BufferRange {
    /// Create a range.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: u32, end: u32, generation: Generation) -> Self {
        assert!(start <= end, "malformed range [{start}, {end})");
        Self {
            start,
            end,
            generation,
        }
    }

    /// First byte offset.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last byte offset.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Generation the range was committed in.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether this is a zero-length range.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the two ranges share at least one byte.
    ///
    /// Generations are ignored: overlap is about memory, not contents.
    /// Empty ranges overlap nothing.
    pub fn overlaps(&self, other: &BufferRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Offsets as a `usize` range for slicing.
    pub fn as_usize_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for BufferRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})@{}", self.start, self.end, self.generation)
    }
}
