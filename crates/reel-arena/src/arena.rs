//! The circular byte arena and its cursor bookkeeping.
//!
//! A [`ResourceArena`] owns a pre-allocated `Vec<u8>` and five offsets
//! into it:
//!
//! ```text
//! 0          real_floor   base = frozen_floor     cursor               end    capacity
//! |-reserved-|--frozen----|------reusable---------|---next free---------|------|
//! ```
//!
//! `freeze()` lifts `base` to the cursor so that everything below it
//! survives later wraps; `unfreeze()` and `reset()` drop it back to the
//! real floor. The arena itself knows nothing about zones: eviction and
//! liveness are the allocator's concern.

use reel_core::Generation;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::range::BufferRange;

/// Fixed-size circular byte arena.
pub struct ResourceArena {
    /// Backing storage. Allocated to full capacity at creation, never resized.
    storage: Vec<u8>,
    /// Absolute floor; nothing below it is ever handed out.
    real_floor: u32,
    /// Floor raised by `freeze()`.
    frozen_floor: u32,
    /// Where wraps return to.
    base: u32,
    /// Exclusive upper bound of the current scene.
    end: u32,
    /// Next free byte.
    cursor: u32,
    /// Bumped on every wrap, reset and unfreeze.
    generation: Generation,
}

impl ResourceArena {
    /// Create an arena spanning all storage above the real floor.
    pub fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            storage: vec![0; config.capacity as usize],
            real_floor: config.real_floor,
            frozen_floor: config.real_floor,
            base: config.real_floor,
            end: config.capacity,
            cursor: config.real_floor,
            generation: Generation(0),
        })
    }

    /// Start a new scene of `total_size` bytes above the real floor.
    ///
    /// Unfreezes and rewinds the cursor. Does not touch the zone
    /// directory; callers clear it themselves when the old contents are
    /// no longer wanted.
    pub fn reset(&mut self, total_size: u32) -> Result<(), ArenaError> {
        let end = self
            .real_floor
            .checked_add(total_size)
            .filter(|&end| end as usize <= self.storage.len())
            .ok_or_else(|| ArenaError::InvalidConfig {
                reason: format!(
                    "scene size {total_size} exceeds storage above real floor ({} bytes)",
                    self.storage.len() as u32 - self.real_floor,
                ),
            })?;
        self.base = self.real_floor;
        self.frozen_floor = self.real_floor;
        self.cursor = self.real_floor;
        self.end = end;
        self.generation = self.generation.next();
        Ok(())
    }

    /// Protect everything below the cursor from subsequent wraps.
    pub fn freeze(&mut self) {
        self.frozen_floor = self.cursor;
        self.base = self.cursor;
    }

    /// Release the frozen region and rewind the cursor to the real floor.
    pub fn unfreeze(&mut self) {
        self.base = self.real_floor;
        self.frozen_floor = self.real_floor;
        self.cursor = self.real_floor;
        self.generation = self.generation.next();
    }

    /// Return the cursor to the base and start a new generation.
    pub(crate) fn wrap(&mut self) {
        self.cursor = self.base;
        self.generation = self.generation.next();
    }

    /// Move the cursor past a rejected region.
    ///
    /// The new position may exceed `end`; the next candidate then wraps.
    pub(crate) fn skip_to(&mut self, offset: u32) {
        debug_assert!(offset > self.cursor, "skip must make progress");
        self.cursor = offset;
    }

    /// Restore a cursor/generation pair saved before a failed allocation.
    pub(crate) fn rewind(&mut self, cursor: u32, generation: Generation) {
        self.cursor = cursor;
        self.generation = generation;
    }

    /// Mark `range` as allocated.
    pub(crate) fn commit(&mut self, range: &BufferRange) {
        debug_assert!(range.start >= self.base && range.end <= self.end);
        self.cursor = range.end;
    }

    /// Read the bytes of a range.
    pub fn bytes(&self, range: &BufferRange) -> Result<&[u8], ArenaError> {
        self.check_bounds(range)?;
        Ok(&self.storage[range.as_usize_range()])
    }

    /// Write access to the bytes of a range.
    pub fn bytes_mut(&mut self, range: &BufferRange) -> Result<&mut [u8], ArenaError> {
        self.check_bounds(range)?;
        Ok(&mut self.storage[range.as_usize_range()])
    }

    fn check_bounds(&self, range: &BufferRange) -> Result<(), ArenaError> {
        if range.end as usize > self.storage.len() {
            return Err(ArenaError::OutOfBounds {
                start: range.start,
                end: range.end,
                capacity: self.storage.len() as u32,
            });
        }
        Ok(())
    }

    /// Wrap target.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Next free byte.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// Floor set by the last `freeze()`.
    pub fn frozen_floor(&self) -> u32 {
        self.frozen_floor
    }

    /// Absolute floor.
    pub fn real_floor(&self) -> u32 {
        self.real_floor
    }

    /// Whether a frozen region is in effect.
    pub fn is_frozen(&self) -> bool {
        self.frozen_floor > self.real_floor
    }

    /// Current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Reusable bytes: `end - base`.
    pub fn span(&self) -> u32 {
        self.end - self.base
    }

    /// Bytes between the base and the cursor.
    pub fn used(&self) -> u32 {
        self.cursor.min(self.end).saturating_sub(self.base)
    }

    /// Bytes between the cursor and the end.
    pub fn remaining(&self) -> u32 {
        self.end.saturating_sub(self.cursor)
    }

    /// Size of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.storage.len()
    }
}
