//! Zone directory: `ZoneId` → up to three buffer ranges.
//!
//! The [`ZoneDirectory`] is the cache index of the arena. Each zone owns
//! a [`ZoneEntry`] with a primary, secondary and audio slot; a slot is
//! either a committed [`BufferRange`] or absent. Absent means the loader
//! must decode the resource again before it can be read.
//!
//! Entries are stored densely, one per zone id, sized once at
//! construction. Zones bound to ROM-resident data are marked
//! [`ZoneResidency::Immutable`]: their ranges index the immutable store,
//! not the arena, so they are skipped by invalidation and liveness.

use reel_core::{BufferKind, ZoneId};
use smallvec::SmallVec;

use crate::error::ArenaError;
use crate::range::BufferRange;

/// Where a zone's ranges point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoneResidency {
    /// Ranges are offsets into the resource arena and may be evicted.
    #[default]
    Arena,
    /// Ranges are offsets into the immutable store; never evicted.
    Immutable,
}

/// The buffers a zone currently holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZoneEntry {
    slots: [Option<BufferRange>; 3],
}

impl ZoneEntry {
    /// An entry with every slot absent.
    pub const ABSENT: ZoneEntry = ZoneEntry { slots: [None; 3] };

    /// The range held in `kind`'s slot.
    pub fn get(&self, kind: BufferKind) -> Option<BufferRange> {
        self.slots[kind.index()]
    }

    /// Primary slot.
    pub fn primary(&self) -> Option<BufferRange> {
        self.get(BufferKind::Primary)
    }

    /// Secondary slot.
    pub fn secondary(&self) -> Option<BufferRange> {
        self.get(BufferKind::Secondary)
    }

    /// Audio slot.
    pub fn audio(&self) -> Option<BufferRange> {
        self.get(BufferKind::Audio)
    }

    /// Whether `kind`'s slot holds a range.
    pub fn has(&self, kind: BufferKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Whether every slot is absent.
    pub fn is_absent(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Present ranges in primary, secondary, audio order.
    pub fn ranges(&self) -> impl Iterator<Item = (BufferKind, BufferRange)> + '_ {
        BufferKind::ALL
            .iter()
            .filter_map(move |&kind| self.get(kind).map(|r| (kind, r)))
    }

    /// The first present range overlapping `candidate`, in slot order.
    pub fn first_overlap(&self, candidate: &BufferRange) -> Option<(BufferKind, BufferRange)> {
        self.ranges().find(|(_, r)| r.overlaps(candidate))
    }

    pub(crate) fn set(&mut self, kind: BufferKind, range: Option<BufferRange>) {
        self.slots[kind.index()] = range;
    }
}

/// A slot cleared because a commit overwrote its memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eviction {
    /// Zone that lost the buffer.
    pub zone: ZoneId,
    /// Which slot was cleared.
    pub kind: BufferKind,
    /// The range it held.
    pub range: BufferRange,
}

/// Dense zone directory.
#[derive(Clone, Debug)]
pub struct ZoneDirectory {
    entries: Vec<ZoneEntry>,
    residency: Vec<ZoneResidency>,
}

impl ZoneDirectory {
    /// Create a directory of `zone_count` absent, arena-resident entries.
    pub fn new(zone_count: u16) -> Self {
        Self {
            entries: vec![ZoneEntry::ABSENT; zone_count as usize],
            residency: vec![ZoneResidency::Arena; zone_count as usize],
        }
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no zones.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check(&self, zone: ZoneId) -> Result<usize, ArenaError> {
        if zone.index() < self.entries.len() {
            Ok(zone.index())
        } else {
            Err(ArenaError::UnknownZone {
                zone,
                zone_count: self.entries.len() as u16,
            })
        }
    }

    /// Copy of a zone's entry.
    pub fn get(&self, zone: ZoneId) -> Result<ZoneEntry, ArenaError> {
        let idx = self.check(zone)?;
        Ok(self.entries[idx])
    }

    /// Borrow a zone's entry, `None` for unknown zones.
    pub fn entry(&self, zone: ZoneId) -> Option<&ZoneEntry> {
        self.entries.get(zone.index())
    }

    /// A zone's residency, `None` for unknown zones.
    pub fn residency(&self, zone: ZoneId) -> Option<ZoneResidency> {
        self.residency.get(zone.index()).copied()
    }

    /// Record a freshly filled arena range.
    pub fn set(
        &mut self,
        zone: ZoneId,
        kind: BufferKind,
        range: BufferRange,
    ) -> Result<(), ArenaError> {
        let idx = self.check(zone)?;
        if self.residency[idx] == ZoneResidency::Immutable {
            return Err(ArenaError::ImmutableZone { zone });
        }
        self.entries[idx].set(kind, Some(range));
        Ok(())
    }

    /// Mark one slot absent. Immutable zones are left untouched.
    pub fn clear(&mut self, zone: ZoneId, kind: BufferKind) -> Result<(), ArenaError> {
        let idx = self.check(zone)?;
        if self.residency[idx] == ZoneResidency::Arena {
            self.entries[idx].set(kind, None);
        }
        Ok(())
    }

    /// Mark every slot of a zone absent. Immutable zones are left untouched.
    pub fn clear_zone(&mut self, zone: ZoneId) -> Result<(), ArenaError> {
        let idx = self.check(zone)?;
        if self.residency[idx] == ZoneResidency::Arena {
            self.entries[idx] = ZoneEntry::ABSENT;
        }
        Ok(())
    }

    /// Mark every arena-resident zone absent.
    pub fn clear_resident(&mut self) {
        for (entry, residency) in self.entries.iter_mut().zip(&self.residency) {
            if *residency == ZoneResidency::Arena {
                *entry = ZoneEntry::ABSENT;
            }
        }
    }

    /// Bind a zone to ROM-resident ranges.
    pub(crate) fn bind_immutable(
        &mut self,
        zone: ZoneId,
        entry: ZoneEntry,
    ) -> Result<(), ArenaError> {
        let idx = self.check(zone)?;
        self.entries[idx] = entry;
        self.residency[idx] = ZoneResidency::Immutable;
        Ok(())
    }

    /// Clear every arena-resident slot overlapping `range`, except those of
    /// `except`.
    ///
    /// Zones are scanned in id order and slots in primary, secondary,
    /// audio order; the returned evictions follow that order.
    pub fn invalidate_overlapping(
        &mut self,
        range: &BufferRange,
        except: Option<ZoneId>,
    ) -> SmallVec<[Eviction; 4]> {
        let mut evicted = SmallVec::new();
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            let zone = ZoneId(idx as u16);
            if Some(zone) == except || self.residency[idx] == ZoneResidency::Immutable {
                continue;
            }
            for kind in BufferKind::ALL {
                if let Some(held) = entry.get(kind) {
                    if held.overlaps(range) {
                        entry.set(kind, None);
                        evicted.push(Eviction {
                            zone,
                            kind,
                            range: held,
                        });
                    }
                }
            }
        }
        evicted
    }

    /// Whether `range` is still exactly what the directory records for
    /// `zone`'s `kind` slot.
    ///
    /// A range retained across a commit that evicted or replaced it
    /// reports `false`, even if a newer allocation reused its offsets.
    pub fn is_current(&self, zone: ZoneId, kind: BufferKind, range: &BufferRange) -> bool {
        self.entry(zone)
            .and_then(|e| e.get(kind))
            .is_some_and(|held| held == *range)
    }

    /// Iterate over all entries in zone id order.
    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &ZoneEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (ZoneId(idx as u16), entry))
    }
}
