//! The zone loader.
//!
//! [`Loader`] owns the [`ZoneAllocator`] and a [`ResourceSource`]. The
//! engine calls [`Loader::ensure_loaded`] whenever a sprite is about to
//! read a zone; the call is a directory lookup when the zone is resident
//! and a header read, allocation and decode otherwise.
//!
//! Buffers of one zone are filled in primary, secondary, audio order.
//! While a zone is being filled it is protected from its own later
//! allocations, so a wrap can never evict a buffer decoded a moment
//! earlier in the same call.

use reel_arena::{
    ArenaConfig, ArenaError, SharedImmutableStore, ZoneAllocator, ZoneEntry, ZoneResidency,
};
use reel_core::{BufferKind, ResourceRef, ResourceSource, SpriteRegistry, ZoneId};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::metrics::LoadMetrics;

/// Loads zones on demand into the resource arena.
pub struct Loader<S> {
    allocator: ZoneAllocator,
    source: S,
    metrics: LoadMetrics,
}

impl<S: ResourceSource> Loader<S> {
    /// Create a loader over a fresh arena.
    pub fn new(config: ArenaConfig, source: S) -> Result<Self, LoadError> {
        Ok(Self {
            allocator: ZoneAllocator::new(config)?,
            source,
            metrics: LoadMetrics::default(),
        })
    }

    /// Make every buffer `zone` declares resident, decoding what is missing.
    ///
    /// `registry` is the current active-sprite list; buffers it reads are
    /// never overwritten. On a decode failure the buffers registered
    /// before the failure stay registered and the failing slot stays
    /// absent.
    pub fn ensure_loaded<R>(&mut self, zone: ZoneId, registry: &R) -> Result<ZoneEntry, LoadError>
    where
        R: SpriteRegistry + ?Sized,
    {
        let entry = self.allocator.entry(zone)?;
        if self.allocator.directory().residency(zone) == Some(ZoneResidency::Immutable) {
            self.metrics.hits += 1;
            return Ok(entry);
        }

        let header = self.source.header(zone).map_err(|source| {
            self.metrics.header_failures += 1;
            warn!(%zone, error = %source, "resource header unreadable");
            LoadError::Header { zone, source }
        })?;

        let missing: SmallVec<[(BufferKind, u32); 3]> = header
            .buffers()
            .filter(|(kind, _)| !entry.has(*kind))
            .collect();
        if missing.is_empty() {
            self.metrics.hits += 1;
            return Ok(entry);
        }

        self.metrics.loads += 1;
        for (kind, size) in missing {
            let resource = ResourceRef::new(zone, kind);
            let range = self
                .allocator
                .allocate_protecting(size, registry, Some(zone))?;
            let buf = self.allocator.bytes_mut(&range)?;
            if let Err(source) = self.source.decode_into(buf, resource) {
                self.metrics.decode_failures += 1;
                warn!(%resource, %range, error = %source, "decode failed");
                return Err(LoadError::Decode { resource, source });
            }
            self.allocator.register(zone, kind, range)?;
            self.metrics.buffers_decoded += 1;
            self.metrics.bytes_decoded += u64::from(size);
            debug!(%resource, %range, "buffer loaded");
        }

        Ok(self.allocator.entry(zone)?)
    }

    /// Enter a new scene of `size` bytes.
    ///
    /// Resets the arena, forgets every arena-resident zone and releases
    /// the pin. Immutable zones are kept.
    pub fn enter_scene(&mut self, size: u32) -> Result<(), LoadError> {
        self.allocator.reset(size)?;
        self.allocator.directory_mut().clear_resident();
        self.allocator.set_pinned(None)?;
        self.metrics.scenes += 1;
        debug!(size, "scene entered");
        Ok(())
    }

    /// Load `zone` and freeze the arena above it so later wraps keep it.
    ///
    /// The freeze only covers `[base, cursor)`. If the zone is resident
    /// elsewhere (above the cursor, or split across a wrap) it is dropped
    /// and decoded again from the base before freezing. Fails with
    /// [`ArenaError::CapacityExhausted`] if live zones leave no run below
    /// the cursor that holds all of its buffers.
    pub fn load_persistent<R>(&mut self, zone: ZoneId, registry: &R) -> Result<ZoneEntry, LoadError>
    where
        R: SpriteRegistry + ?Sized,
    {
        let mut entry = self.ensure_loaded(zone, registry)?;
        if !self.below_cursor(zone, &entry) {
            debug!(%zone, "persistent zone outside the freeze region, reloading from base");
            self.allocator.directory_mut().clear_zone(zone)?;
            self.allocator.wrap_to_base();
            entry = self.ensure_loaded(zone, registry)?;
            if !self.below_cursor(zone, &entry) {
                let arena = self.allocator.arena();
                let requested = entry.ranges().map(|(_, r)| r.len()).sum();
                warn!(%zone, requested, "persistent zone does not fit below the cursor");
                return Err(ArenaError::CapacityExhausted {
                    requested,
                    span: arena.span(),
                }
                .into());
            }
        }
        self.allocator.freeze();
        Ok(entry)
    }

    /// Whether every arena buffer of `zone` lies in `[base, cursor)`.
    fn below_cursor(&self, zone: ZoneId, entry: &ZoneEntry) -> bool {
        if self.allocator.directory().residency(zone) == Some(ZoneResidency::Immutable) {
            return true;
        }
        let arena = self.allocator.arena();
        entry
            .ranges()
            .all(|(_, r)| r.start() >= arena.base() && r.end() <= arena.cursor())
    }

    /// Drop the frozen region set up by [`Loader::load_persistent`].
    pub fn leave_persistent(&mut self) {
        self.allocator.unfreeze();
    }

    /// Mark all of `zone`'s buffers absent.
    pub fn release(&mut self, zone: ZoneId) -> Result<(), LoadError> {
        if self.allocator.pinned() == Some(zone) {
            self.allocator.set_pinned(None)?;
        }
        self.allocator.directory_mut().clear_zone(zone)?;
        Ok(())
    }

    /// Pin `zone`, or clear the pin.
    pub fn pin(&mut self, zone: Option<ZoneId>) -> Result<(), LoadError> {
        self.allocator.set_pinned(zone)?;
        Ok(())
    }

    /// Bind ROM-resident zones.
    pub fn register_immutable(&mut self, store: SharedImmutableStore) -> Result<(), LoadError> {
        self.allocator.bind_immutable(store)?;
        Ok(())
    }

    /// Bytes of a resident buffer.
    ///
    /// Returns `Ok(None)` if the slot is absent; call
    /// [`Loader::ensure_loaded`] first.
    pub fn read(&self, zone: ZoneId, kind: BufferKind) -> Result<Option<&[u8]>, LoadError> {
        self.allocator.read(zone, kind).map_err(LoadError::from)
    }

    /// Copy of a zone's directory entry.
    pub fn entry(&self, zone: ZoneId) -> Result<ZoneEntry, ArenaError> {
        self.allocator.entry(zone)
    }

    /// The allocator.
    pub fn allocator(&self) -> &ZoneAllocator {
        &self.allocator
    }

    /// Mutable allocator, for callers managing ranges by hand.
    pub fn allocator_mut(&mut self) -> &mut ZoneAllocator {
        &mut self.allocator
    }

    /// The resource source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable resource source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Cumulative counters.
    pub fn metrics(&self) -> &LoadMetrics {
        &self.metrics
    }
}
