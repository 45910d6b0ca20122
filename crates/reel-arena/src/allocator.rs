//! The zone allocator: first fit with linear retry and eviction.
//!
//! [`ZoneAllocator`] is the single owner of the arena and the zone
//! directory. Each call to [`ZoneAllocator::allocate`] runs to completion:
//!
//! 1. candidate = `[cursor, cursor + size)`;
//! 2. if it runs past `end`, wrap the cursor to `base` and retry;
//! 3. if it overlaps the pinned zone, skip past that range and retry;
//! 4. if it overlaps a zone read by an active sprite, skip past the first
//!    such range (registry order) and retry;
//! 5. otherwise commit: advance the cursor and evict every other zone
//!    slot the candidate overlaps.
//!
//! Every skip moves the cursor strictly forward, so a pass from the base
//! reaches `end` in bounded steps. A second wrap within one call means no
//! offset of the circumference is usable and the call fails with
//! [`ArenaError::CapacityExhausted`].

use reel_core::{BufferKind, SpriteRegistry, ZoneId};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::arena::ResourceArena;
use crate::config::ArenaConfig;
use crate::directory::{Eviction, ZoneDirectory, ZoneEntry, ZoneResidency};
use crate::error::ArenaError;
use crate::immutable::SharedImmutableStore;
use crate::liveness::{first_collision, CollisionCause};
use crate::metrics::AllocMetrics;
use crate::range::BufferRange;

/// Owner of the resource arena, the zone directory and the pin.
pub struct ZoneAllocator {
    arena: ResourceArena,
    directory: ZoneDirectory,
    pinned: Option<ZoneId>,
    immutable: Option<SharedImmutableStore>,
    /// Evictions performed by the most recent commit.
    last_evictions: SmallVec<[Eviction; 4]>,
    metrics: AllocMetrics,
}

impl ZoneAllocator {
    /// Create an allocator over a fresh arena.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        let arena = ResourceArena::new(&config)?;
        let directory = ZoneDirectory::new(config.zone_count);
        Ok(Self {
            arena,
            directory,
            pinned: None,
            immutable: None,
            last_evictions: SmallVec::new(),
            metrics: AllocMetrics::default(),
        })
    }

    /// Allocate `size` bytes that no active sprite or the pinned zone reads.
    ///
    /// On success the caller must fill the range and register it with
    /// [`ZoneAllocator::register`] before the next allocation.
    pub fn allocate<R>(&mut self, size: u32, registry: &R) -> Result<BufferRange, ArenaError>
    where
        R: SpriteRegistry + ?Sized,
    {
        self.allocate_protecting(size, registry, None)
    }

    /// [`ZoneAllocator::allocate`], additionally treating `protect` like the
    /// pinned zone for this call.
    ///
    /// Used while filling a multi-buffer zone so that allocating its later
    /// buffers cannot evict the ones already committed.
    pub fn allocate_protecting<R>(
        &mut self,
        size: u32,
        registry: &R,
        protect: Option<ZoneId>,
    ) -> Result<BufferRange, ArenaError>
    where
        R: SpriteRegistry + ?Sized,
    {
        let span = self.arena.span();
        if size > span {
            warn!(size, span, "allocation larger than arena span");
            return Err(ArenaError::RequestTooLarge {
                requested: size,
                span,
            });
        }

        let saved_cursor = self.arena.cursor();
        let saved_generation = self.arena.generation();
        let mut wrapped = false;

        loop {
            let start = self.arena.cursor();
            let fits = start
                .checked_add(size)
                .filter(|&end| end <= self.arena.end());
            let Some(end) = fits else {
                if wrapped {
                    self.arena.rewind(saved_cursor, saved_generation);
                    self.metrics.exhaustion_failures += 1;
                    warn!(size, span, "no gap free of live zones");
                    return Err(ArenaError::CapacityExhausted {
                        requested: size,
                        span,
                    });
                }
                wrapped = true;
                self.arena.wrap();
                self.metrics.wraps += 1;
                debug!(
                    cursor = start,
                    base = self.arena.base(),
                    generation = %self.arena.generation(),
                    "arena wrapped"
                );
                continue;
            };

            let candidate = BufferRange::new(start, end, self.arena.generation());
            if let Some(hit) =
                first_collision(&candidate, &self.directory, registry, self.pinned, protect)
            {
                match hit.cause {
                    CollisionCause::Pinned => self.metrics.pin_rejections += 1,
                    CollisionCause::Protected => self.metrics.protected_rejections += 1,
                    CollisionCause::LiveSprite { .. } => self.metrics.liveness_rejections += 1,
                }
                trace!(
                    %candidate,
                    zone = %hit.zone,
                    kind = %hit.kind,
                    cause = ?hit.cause,
                    "candidate rejected"
                );
                self.arena.skip_to(hit.resume_at());
                continue;
            }

            self.commit(&candidate);
            return Ok(candidate);
        }
    }

    fn commit(&mut self, candidate: &BufferRange) {
        self.arena.commit(candidate);
        self.last_evictions = self
            .directory
            .invalidate_overlapping(candidate, self.pinned);
        for eviction in &self.last_evictions {
            debug!(
                zone = %eviction.zone,
                kind = %eviction.kind,
                range = %eviction.range,
                "zone buffer evicted"
            );
        }
        self.metrics.allocations += 1;
        self.metrics.bytes_committed += u64::from(candidate.len());
        self.metrics.evictions += self.last_evictions.len() as u64;
    }

    /// Record a filled range in the directory.
    pub fn register(
        &mut self,
        zone: ZoneId,
        kind: BufferKind,
        range: BufferRange,
    ) -> Result<(), ArenaError> {
        debug_assert!(
            range.generation() == self.arena.generation(),
            "stale range {range} registered for zone {zone} in generation {}",
            self.arena.generation()
        );
        debug_assert!(
            range.end() <= self.arena.end(),
            "range {range} for zone {zone} ends past the scene end {}",
            self.arena.end()
        );
        if range.end() as usize > self.arena.memory_bytes() {
            return Err(ArenaError::OutOfBounds {
                start: range.start(),
                end: range.end(),
                capacity: self.arena.memory_bytes() as u32,
            });
        }
        self.directory.set(zone, kind, range)
    }

    /// Protect `zone` from eviction regardless of liveness, or clear the pin.
    pub fn set_pinned(&mut self, zone: Option<ZoneId>) -> Result<(), ArenaError> {
        if let Some(zone) = zone {
            self.directory.get(zone)?;
        }
        debug!(pinned = ?zone, "pinned zone changed");
        self.pinned = zone;
        Ok(())
    }

    /// The pinned zone.
    pub fn pinned(&self) -> Option<ZoneId> {
        self.pinned
    }

    /// Bind every zone in `store` as ROM-resident.
    ///
    /// Fails without binding anything if the store names a zone outside
    /// the directory.
    pub fn bind_immutable(&mut self, store: SharedImmutableStore) -> Result<(), ArenaError> {
        let zones = store.zones();
        for &zone in &zones {
            self.directory.get(zone)?;
        }
        for zone in zones {
            self.directory.bind_immutable(zone, store.entry(zone))?;
            debug!(%zone, "zone bound to immutable store");
        }
        self.immutable = Some(store);
        Ok(())
    }

    /// Start a new scene. See [`ResourceArena::reset`].
    pub fn reset(&mut self, total_size: u32) -> Result<(), ArenaError> {
        self.arena.reset(total_size)?;
        debug!(total_size, base = self.arena.base(), "arena reset");
        Ok(())
    }

    /// Send the cursor back to the base, as if the tail had been reached.
    ///
    /// The next allocation starts a fresh pass over `[base, end)`.
    pub fn wrap_to_base(&mut self) {
        let from = self.arena.cursor();
        self.arena.wrap();
        self.metrics.wraps += 1;
        debug!(
            cursor = from,
            base = self.arena.base(),
            generation = %self.arena.generation(),
            "arena wrapped on request"
        );
    }

    /// Protect everything allocated so far from later wraps.
    pub fn freeze(&mut self) {
        self.arena.freeze();
        debug!(frozen_floor = self.arena.frozen_floor(), "arena frozen");
    }

    /// Release the frozen region.
    pub fn unfreeze(&mut self) {
        self.arena.unfreeze();
        debug!(base = self.arena.base(), "arena unfrozen");
    }

    /// Bytes of a zone's buffer, from the arena or the immutable store.
    ///
    /// `Ok(None)` if the slot is absent.
    pub fn read(&self, zone: ZoneId, kind: BufferKind) -> Result<Option<&[u8]>, ArenaError> {
        let Some(range) = self.directory.get(zone)?.get(kind) else {
            return Ok(None);
        };
        match self.directory.residency(zone) {
            Some(ZoneResidency::Immutable) => {
                let store = self
                    .immutable
                    .as_ref()
                    .ok_or(ArenaError::ImmutableZone { zone })?;
                store.bytes(&range).map(Some).ok_or(ArenaError::OutOfBounds {
                    start: range.start(),
                    end: range.end(),
                    capacity: store.memory_bytes() as u32,
                })
            }
            _ => self.arena.bytes(&range).map(Some),
        }
    }

    /// Write access to a freshly allocated range.
    pub fn bytes_mut(&mut self, range: &BufferRange) -> Result<&mut [u8], ArenaError> {
        self.arena.bytes_mut(range)
    }

    /// Copy of a zone's directory entry.
    pub fn entry(&self, zone: ZoneId) -> Result<ZoneEntry, ArenaError> {
        self.directory.get(zone)
    }

    /// The arena.
    pub fn arena(&self) -> &ResourceArena {
        &self.arena
    }

    /// The zone directory.
    pub fn directory(&self) -> &ZoneDirectory {
        &self.directory
    }

    /// Mutable zone directory, for releases and scene clears.
    pub fn directory_mut(&mut self) -> &mut ZoneDirectory {
        &mut self.directory
    }

    /// Slots cleared by the most recent commit.
    pub fn last_evictions(&self) -> &[Eviction] {
        &self.last_evictions
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &AllocMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::immutable::ImmutableStore;
    use reel_core::{ResourceRef, SpriteList};

    fn allocator(capacity: u32) -> ZoneAllocator {
        ZoneAllocator::new(ArenaConfig::new(capacity).with_zone_count(8)).unwrap()
    }

    fn place(
        alloc: &mut ZoneAllocator,
        sprites: &SpriteList,
        zone: u16,
        size: u32,
    ) -> BufferRange {
        let range = alloc.allocate(size, sprites).unwrap();
        alloc.register(ZoneId(zone), BufferKind::Primary, range).unwrap();
        range
    }

    fn span(range: &BufferRange) -> (u32, u32) {
        (range.start(), range.end())
    }

    #[test]
    fn sequential_allocations_are_contiguous() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        let a = alloc.allocate(100, &sprites).unwrap();
        let b = alloc.allocate(50, &sprites).unwrap();
        assert_eq!(span(&a), (0, 100));
        assert_eq!(span(&b), (100, 150));
        assert_eq!(alloc.arena().cursor(), 150);
    }

    #[test]
    fn wrap_returns_to_base() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        place(&mut alloc, &sprites, 0, 950);
        let range = alloc.allocate(100, &sprites).unwrap();
        assert_eq!(span(&range), (0, 100));
        assert_eq!(alloc.metrics().wraps, 1);
        assert_eq!(range.generation(), alloc.arena().generation());
    }

    #[test]
    fn exact_fit_at_end_does_not_wrap() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        alloc.allocate(900, &sprites).unwrap();
        let range = alloc.allocate(100, &sprites).unwrap();
        assert_eq!(span(&range), (900, 1000));
        assert_eq!(alloc.metrics().wraps, 0);
    }

    #[test]
    fn reset_then_allocate_starts_at_base() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        alloc.allocate(700, &sprites).unwrap();
        alloc.reset(1000).unwrap();
        let range = alloc.allocate(1000, &sprites).unwrap();
        assert_eq!(span(&range), (0, 1000));
    }

    #[test]
    fn pinned_zone_is_skipped() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        place(&mut alloc, &sprites, 3, 200);
        alloc.set_pinned(Some(ZoneId(3))).unwrap();
        alloc.reset(1000).unwrap();

        let range = alloc.allocate(150, &sprites).unwrap();
        assert_eq!(span(&range), (200, 350));
        assert_eq!(alloc.metrics().pin_rejections, 1);
        assert!(alloc.entry(ZoneId(3)).unwrap().has(BufferKind::Primary));
    }

    #[test]
    fn live_sprite_zone_is_skipped_and_stale_zone_evicted() {
        let mut alloc = allocator(1000);
        let mut sprites = SpriteList::new();
        let a = place(&mut alloc, &sprites, 0, 200);
        place(&mut alloc, &sprites, 1, 300);
        place(&mut alloc, &sprites, 2, 300);
        assert_eq!(alloc.arena().cursor(), 800);
        sprites.spawn(ZoneId(0));

        let range = alloc.allocate(600, &sprites).unwrap();
        assert_eq!(span(&range), (200, 800));
        assert_eq!(alloc.entry(ZoneId(0)).unwrap().primary(), Some(a));
        assert!(alloc.entry(ZoneId(1)).unwrap().is_absent());
        assert!(alloc.entry(ZoneId(2)).unwrap().is_absent());
        let evicted: Vec<_> = alloc.last_evictions().iter().map(|e| e.zone).collect();
        assert_eq!(evicted, vec![ZoneId(1), ZoneId(2)]);
        assert_eq!(alloc.metrics().liveness_rejections, 1);
    }

    #[test]
    fn request_larger_than_span_is_rejected() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        assert!(matches!(
            alloc.allocate(1001, &sprites),
            Err(ArenaError::RequestTooLarge { .. })
        ));
    }

    #[test]
    fn exhaustion_is_reported_without_side_effects() {
        let mut alloc = allocator(1000);
        let mut sprites = SpriteList::new();
        place(&mut alloc, &sprites, 0, 400);
        place(&mut alloc, &sprites, 1, 200);
        place(&mut alloc, &sprites, 2, 400);
        sprites.spawn(ZoneId(0));
        sprites.spawn(ZoneId(2));
        let cursor = alloc.arena().cursor();
        let generation = alloc.arena().generation();

        assert!(matches!(
            alloc.allocate(300, &sprites),
            Err(ArenaError::CapacityExhausted { .. })
        ));
        assert_eq!(alloc.arena().cursor(), cursor);
        assert_eq!(alloc.arena().generation(), generation);
        assert!(alloc.entry(ZoneId(1)).unwrap().has(BufferKind::Primary));
        assert_eq!(alloc.metrics().exhaustion_failures, 1);

        // The 200-byte gap held by the idle zone is still usable.
        let range = alloc.allocate(200, &sprites).unwrap();
        assert_eq!(span(&range), (400, 600));
    }

    #[test]
    fn protected_zone_survives_its_own_fill() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        alloc.allocate(900, &sprites).unwrap();
        alloc.reset(1000).unwrap();
        let primary = alloc.allocate(100, &sprites).unwrap();
        alloc.register(ZoneId(5), BufferKind::Primary, primary).unwrap();

        // Without protection a wrap at 0 would land on the primary buffer.
        alloc.allocate(850, &sprites).unwrap();
        let audio = alloc
            .allocate_protecting(100, &sprites, Some(ZoneId(5)))
            .unwrap();
        assert!(!audio.overlaps(&primary));
        assert_eq!(alloc.metrics().protected_rejections, 1);
        assert!(alloc.entry(ZoneId(5)).unwrap().has(BufferKind::Primary));
    }

    #[test]
    fn wrap_to_base_starts_a_new_pass() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        let kept = place(&mut alloc, &sprites, 0, 300);
        let before = alloc.arena().generation();
        alloc.wrap_to_base();
        assert_eq!(alloc.arena().cursor(), 0);
        assert_eq!(alloc.arena().generation(), before.next());
        assert_eq!(alloc.metrics().wraps, 1);
        // Nothing is evicted until the next commit.
        assert_eq!(alloc.entry(ZoneId(0)).unwrap().primary(), Some(kept));
        let range = alloc.allocate(100, &sprites).unwrap();
        assert_eq!(span(&range), (0, 100));
        assert!(alloc.entry(ZoneId(0)).unwrap().is_absent());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "stale range")]
    fn register_rejects_range_from_earlier_generation() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        let old = alloc.allocate(600, &sprites).unwrap();
        // Wraps, so `old` now belongs to a past generation.
        alloc.allocate(600, &sprites).unwrap();
        let _ = alloc.register(ZoneId(1), BufferKind::Primary, old);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "ends past the scene end")]
    fn register_rejects_range_past_scene_end() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        alloc.reset(500).unwrap();
        alloc.allocate(10, &sprites).unwrap();
        let generation = alloc.arena().generation();
        let outside = BufferRange::new(600, 700, generation);
        let _ = alloc.register(ZoneId(1), BufferKind::Primary, outside);
    }

    #[test]
    fn freeze_protects_region_below_cursor() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        let ui = place(&mut alloc, &sprites, 0, 300);
        alloc.freeze();
        alloc.allocate(600, &sprites).unwrap();
        let range = alloc.allocate(200, &sprites).unwrap();
        assert_eq!(span(&range), (300, 500));
        assert_eq!(alloc.entry(ZoneId(0)).unwrap().primary(), Some(ui));

        alloc.unfreeze();
        let range = alloc.allocate(100, &sprites).unwrap();
        assert_eq!(span(&range), (0, 100));
        assert!(alloc.entry(ZoneId(0)).unwrap().is_absent());
    }

    #[test]
    fn zero_sized_allocation_evicts_nothing() {
        let mut alloc = allocator(1000);
        let sprites = SpriteList::new();
        place(&mut alloc, &sprites, 0, 100);
        alloc.reset(1000).unwrap();
        let range = alloc.allocate(0, &sprites).unwrap();
        assert!(range.is_empty());
        assert!(alloc.last_evictions().is_empty());
        assert!(alloc.entry(ZoneId(0)).unwrap().has(BufferKind::Primary));
    }

    #[test]
    fn read_resolves_arena_and_immutable_zones() {
        let mut alloc = allocator(64);
        let sprites = SpriteList::new();
        let store = ImmutableStore::new(&[(
            ResourceRef::new(ZoneId(7), BufferKind::Primary),
            &[5u8, 6, 7][..],
        )]);
        alloc.bind_immutable(store.into_shared()).unwrap();

        let range = alloc.allocate(2, &sprites).unwrap();
        alloc.bytes_mut(&range).unwrap().copy_from_slice(&[1, 2]);
        alloc.register(ZoneId(1), BufferKind::Audio, range).unwrap();

        assert_eq!(alloc.read(ZoneId(1), BufferKind::Audio).unwrap(), Some(&[1u8, 2][..]));
        assert_eq!(alloc.read(ZoneId(7), BufferKind::Primary).unwrap(), Some(&[5u8, 6, 7][..]));
        assert_eq!(alloc.read(ZoneId(1), BufferKind::Primary).unwrap(), None);
    }

    #[test]
    fn immutable_zone_never_collides() {
        let mut alloc = allocator(64);
        let mut sprites = SpriteList::new();
        let store = ImmutableStore::new(&[(
            ResourceRef::new(ZoneId(7), BufferKind::Primary),
            &[0u8; 32][..],
        )]);
        alloc.bind_immutable(store.into_shared()).unwrap();
        alloc.set_pinned(Some(ZoneId(7))).unwrap();
        sprites.spawn(ZoneId(7));

        let range = alloc.allocate(16, &sprites).unwrap();
        assert_eq!(span(&range), (0, 16));
        assert!(alloc.entry(ZoneId(7)).unwrap().has(BufferKind::Primary));
    }

    #[test]
    fn pin_on_unknown_zone_is_rejected() {
        let mut alloc = allocator(64);
        assert!(matches!(
            alloc.set_pinned(Some(ZoneId(8))),
            Err(ArenaError::UnknownZone { .. })
        ));
        assert_eq!(alloc.pinned(), None);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Load { zone: u16, size: u32 },
            Spawn { zone: u16 },
            Retire { slot: usize },
        }

        fn arb_op() -> impl Strategy<Value = Op> {
            prop_oneof![
                4 => (0u16..8, 1u32..200).prop_map(|(zone, size)| Op::Load { zone, size }),
                2 => (0u16..8).prop_map(|zone| Op::Spawn { zone }),
                1 => (0usize..8).prop_map(|slot| Op::Retire { slot }),
            ]
        }

        proptest! {
            #[test]
            fn live_ranges_never_alias(ops in prop::collection::vec(arb_op(), 1..120)) {
                let mut alloc = allocator(1000);
                let mut sprites = SpriteList::new();
                let mut ids = Vec::new();

                for op in ops {
                    match op {
                        Op::Load { zone, size } => {
                            let zone = ZoneId(zone);
                            let before: Vec<_> = alloc.directory().iter()
                                .map(|(z, e)| (z, *e))
                                .collect();
                            match alloc.allocate(size, &sprites) {
                                Ok(range) => {
                                    // Every pre-existing overlapping slot is now absent.
                                    for (z, entry) in &before {
                                        for (kind, held) in entry.ranges() {
                                            if held.overlaps(&range) {
                                                prop_assert!(!sprites.is_zone_live(*z));
                                                let now = alloc.entry(*z).unwrap();
                                                prop_assert!(now.get(kind).is_none());
                                            }
                                        }
                                    }
                                    alloc.register(zone, BufferKind::Primary, range).unwrap();
                                }
                                Err(ArenaError::CapacityExhausted { .. }) => {}
                                Err(e) => prop_assert!(false, "unexpected error: {e}"),
                            }
                        }
                        Op::Spawn { zone } => {
                            if alloc.entry(ZoneId(zone)).unwrap().has(BufferKind::Primary) {
                                ids.push(sprites.spawn(ZoneId(zone)));
                            }
                        }
                        Op::Retire { slot } => {
                            if slot < ids.len() {
                                let id = ids.remove(slot);
                                sprites.retire(id);
                            }
                        }
                    }

                    // No two live zones share a byte.
                    let live: Vec<BufferRange> = sprites
                        .live_zones()
                        .iter()
                        .filter_map(|z| alloc.entry(*z).unwrap().primary())
                        .collect();
                    for (i, a) in live.iter().enumerate() {
                        for b in &live[i + 1..] {
                            prop_assert!(!a.overlaps(b), "{a} overlaps {b}");
                        }
                    }
                }
            }
        }
    }
}
