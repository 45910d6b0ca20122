//! Collision scan of an allocation candidate against protected zones.
//!
//! A candidate collides with:
//! 1. the pinned zone, regardless of liveness;
//! 2. the zone currently being loaded, if any;
//! 3. the zone of every active sprite, scanned in registry order.
//!
//! Within a zone, slots are tested in primary, secondary, audio order.
//! The first overlap found wins; there is no search for the smallest
//! skip. Immutable zones are never tested: their ranges do not index the
//! arena.

use reel_core::{BufferKind, LiveSprite, SpriteRegistry, ZoneId};

use crate::directory::{ZoneDirectory, ZoneResidency};
use crate::range::BufferRange;

/// Why a candidate was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionCause {
    /// Overlapped the pinned zone.
    Pinned,
    /// Overlapped the zone the caller is filling.
    Protected,
    /// Overlapped the zone of the active sprite at this registry index.
    LiveSprite {
        /// Position of the sprite in the registry.
        index: usize,
    },
}

/// The first protected range a candidate overlaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collision {
    /// Zone owning the overlapped range.
    pub zone: ZoneId,
    /// Slot of the overlapped range.
    pub kind: BufferKind,
    /// The overlapped range.
    pub range: BufferRange,
    /// Reason the zone is protected.
    pub cause: CollisionCause,
}

impl Collision {
    /// Where the cursor resumes after this rejection.
    pub fn resume_at(&self) -> u32 {
        self.range.end()
    }
}

fn zone_overlap(
    directory: &ZoneDirectory,
    zone: ZoneId,
    candidate: &BufferRange,
) -> Option<(BufferKind, BufferRange)> {
    if directory.residency(zone)? == ZoneResidency::Immutable {
        return None;
    }
    directory.entry(zone)?.first_overlap(candidate)
}

/// Find the first protected range `candidate` overlaps.
pub fn first_collision<R>(
    candidate: &BufferRange,
    directory: &ZoneDirectory,
    registry: &R,
    pinned: Option<ZoneId>,
    protect: Option<ZoneId>,
) -> Option<Collision>
where
    R: SpriteRegistry + ?Sized,
{
    if let Some(zone) = pinned {
        if let Some((kind, range)) = zone_overlap(directory, zone, candidate) {
            return Some(Collision {
                zone,
                kind,
                range,
                cause: CollisionCause::Pinned,
            });
        }
    }

    if let Some(zone) = protect {
        if let Some((kind, range)) = zone_overlap(directory, zone, candidate) {
            return Some(Collision {
                zone,
                kind,
                range,
                cause: CollisionCause::Protected,
            });
        }
    }

    registry
        .sprites()
        .iter()
        .enumerate()
        .filter(|(_, sprite)| sprite.is_active())
        .find_map(|(index, sprite)| {
            let zone = sprite.zone_id();
            zone_overlap(directory, zone, candidate).map(|(kind, range)| Collision {
                zone,
                kind,
                range,
                cause: CollisionCause::LiveSprite { index },
            })
        })
}
