//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use reel_core::ZoneId;

/// Errors that can occur during arena operations.
///
/// Apart from `UnknownZone` and `OutOfBounds`, these indicate a
/// capacity-planning or configuration bug in the caller rather than a
/// condition to retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Configuration or reset parameters are inconsistent.
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
    /// A zone id outside the directory.
    UnknownZone {
        /// The unrecognised zone.
        zone: ZoneId,
        /// Number of zones in the directory.
        zone_count: u16,
    },
    /// The request is larger than the whole arena span.
    RequestTooLarge {
        /// Bytes requested.
        requested: u32,
        /// Current `end - base`.
        span: u32,
    },
    /// Every candidate around the full circumference collided with a
    /// live or pinned zone.
    CapacityExhausted {
        /// Bytes requested.
        requested: u32,
        /// Current `end - base`.
        span: u32,
    },
    /// Attempted to register an arena range on a ROM-resident zone.
    ImmutableZone {
        /// The immutable zone.
        zone: ZoneId,
    },
    /// A range lies outside the backing storage.
    OutOfBounds {
        /// Range start offset.
        start: u32,
        /// Range end offset.
        end: u32,
        /// Size of the storage it was resolved against.
        capacity: u32,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::UnknownZone { zone, zone_count } => {
                write!(f, "unknown zone {zone} (directory holds {zone_count} zones)")
            }
            Self::RequestTooLarge { requested, span } => {
                write!(
                    f,
                    "request of {requested} bytes exceeds arena span of {span} bytes"
                )
            }
            Self::CapacityExhausted { requested, span } => {
                write!(
                    f,
                    "arena exhausted: no {requested}-byte gap free of live zones in {span} bytes"
                )
            }
            Self::ImmutableZone { zone } => write!(f, "zone {zone} is immutable"),
            Self::OutOfBounds {
                start,
                end,
                capacity,
            } => {
                write!(
                    f,
                    "range [{start}, {end}) outside storage of {capacity} bytes"
                )
            }
        }
    }
}

impl Error for ArenaError {}
