//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the resource arena.
///
/// Controls the size of the backing storage, the reserved floor below
/// the arena, and the cardinality of the zone directory. Validated by
/// [`ArenaConfig::validate`]; all values are immutable after creation.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Size of the backing storage in bytes.
    ///
    /// Default: 262_144 (256KB). The arena proper occupies
    /// `[real_floor, real_floor + scene_size)` inside this storage.
    pub capacity: u32,

    /// Bytes reserved below the arena (the real floor).
    ///
    /// Default: 0. Must be strictly less than `capacity`.
    pub real_floor: u32,

    /// Number of zones in the directory.
    ///
    /// Default: 64. Zone ids `0..zone_count` are valid.
    pub zone_count: u16,
}

impl ArenaConfig {
    /// Default backing storage size in bytes.
    pub const DEFAULT_CAPACITY: u32 = 256 * 1024;

    /// Default reserved floor.
    pub const DEFAULT_REAL_FLOOR: u32 = 0;

    /// Default directory size.
    pub const DEFAULT_ZONE_COUNT: u16 = 64;

    /// Create a config with the given capacity and default floor and zone count.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            real_floor: Self::DEFAULT_REAL_FLOOR,
            zone_count: Self::DEFAULT_ZONE_COUNT,
        }
    }

    /// Set the reserved floor.
    pub fn with_real_floor(mut self, real_floor: u32) -> Self {
        self.real_floor = real_floor;
        self
    }

    /// Set the directory size.
    pub fn with_zone_count(mut self, zone_count: u16) -> Self {
        self.zone_count = zone_count;
        self
    }

    /// Largest scene size `reset()` will accept.
    pub fn max_scene_size(&self) -> u32 {
        self.capacity.saturating_sub(self.real_floor)
    }

    /// Check the config for internal consistency.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "capacity must be non-zero".into(),
            });
        }
        if self.real_floor >= self.capacity {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "real_floor ({}) must be below capacity ({})",
                    self.real_floor, self.capacity,
                ),
            });
        }
        if self.zone_count == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "zone_count must be non-zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
