//! Error types shared across the Reel workspace.
//!
//! Only errors raised at the decode boundary live here; arena and loader
//! errors are defined in their own crates.

use std::error::Error;
use std::fmt;

use crate::id::ZoneId;

/// Errors reported by a resource decoder while filling a buffer.
///
/// A decode failure never invalidates the memory it was writing into:
/// the buffer stays committed, only its contents are unusable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The source ran out of bytes before the buffer was filled.
    Truncated {
        /// Bytes the buffer expected.
        expected: usize,
        /// Bytes actually available.
        available: usize,
    },
    /// The encoded stream is malformed.
    Corrupt {
        /// Human-readable description of the fault.
        reason: String,
    },
    /// The container has no resource for this zone.
    MissingResource {
        /// The zone that was requested.
        zone: ZoneId,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated {
                expected,
                available,
            } => {
                write!(
                    f,
                    "truncated resource: expected {expected} bytes, {available} available"
                )
            }
            Self::Corrupt { reason } => write!(f, "corrupt resource: {reason}"),
            Self::MissingResource { zone } => write!(f, "no resource for zone {zone}"),
        }
    }
}

impl Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_sizes() {
        let e = DecodeError::Truncated {
            expected: 64,
            available: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("64"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn missing_resource_names_zone() {
        let e = DecodeError::MissingResource { zone: ZoneId(12) };
        assert_eq!(e.to_string(), "no resource for zone 12");
    }
}
