//! Loader error types.

use std::error::Error;
use std::fmt;

use reel_arena::ArenaError;
use reel_core::{DecodeError, ResourceRef, ZoneId};

/// Errors surfaced to the engine by [`Loader`](crate::Loader) operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    /// The arena could not provide memory, or the zone is unknown.
    Arena(ArenaError),
    /// The resource header could not be read.
    Header {
        /// Zone whose header failed.
        zone: ZoneId,
        /// Underlying decoder error.
        source: DecodeError,
    },
    /// Decoding into an allocated buffer failed.
    ///
    /// The buffer stays committed but is not registered; the zone reports
    /// the slot absent and the next `ensure_loaded` retries it.
    Decode {
        /// The block that failed.
        resource: ResourceRef,
        /// Underlying decoder error.
        source: DecodeError,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena error: {e}"),
            Self::Header { zone, source } => {
                write!(f, "failed to read header of zone {zone}: {source}")
            }
            Self::Decode { resource, source } => {
                write!(f, "failed to decode {resource}: {source}")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Header { source, .. } | Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<ArenaError> for LoadError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_core::BufferKind;

    #[test]
    fn decode_error_chains_source() {
        let e = LoadError::Decode {
            resource: ResourceRef::new(ZoneId(4), BufferKind::Secondary),
            source: DecodeError::Corrupt {
                reason: "bad run length".into(),
            },
        };
        assert_eq!(
            e.to_string(),
            "failed to decode zone 4/secondary: corrupt resource: bad run length"
        );
        assert!(e.source().is_some());
    }

    #[test]
    fn arena_error_converts() {
        let e: LoadError = ArenaError::UnknownZone {
            zone: ZoneId(99),
            zone_count: 8,
        }
        .into();
        assert!(matches!(e, LoadError::Arena(ArenaError::UnknownZone { .. })));
    }
}
