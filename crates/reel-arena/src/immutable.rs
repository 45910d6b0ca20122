//! ROM-resident zone data that lives outside the arena.
//!
//! [`ImmutableStore`] holds resource blocks that are baked into the
//! program image (title cards, system fonts, the cursor sprite). They are
//! packed into a single contiguous `Vec<u8>` with an offset table and
//! shared via `Arc`. Zones bound to the store are never evicted and never
//! collide with arena candidates.

use std::sync::Arc;

use indexmap::IndexMap;
use reel_core::{BufferKind, Generation, ResourceRef, ZoneId};

use crate::directory::ZoneEntry;
use crate::range::BufferRange;

/// Contiguous storage for immutable resource blocks.
pub struct ImmutableStore {
    /// All blocks, packed in registration order.
    data: Vec<u8>,
    /// Maps each block to `(offset, len)` within `data`.
    blocks: IndexMap<ResourceRef, (usize, usize)>,
}

/// Shared handle to an immutable store.
pub type SharedImmutableStore = Arc<ImmutableStore>;

impl ImmutableStore {
    /// Create a store by copying the given blocks.
    ///
    /// # Panics
    ///
    /// Panics if the same `(zone, kind)` appears twice.
    pub fn new(blocks: &[(ResourceRef, &[u8])]) -> Self {
        for (i, (r, _)) in blocks.iter().enumerate() {
            for (other, _) in &blocks[i + 1..] {
                assert!(r != other, "duplicate immutable block for {r}");
            }
        }

        let total: usize = blocks.iter().map(|(_, bytes)| bytes.len()).sum();
        let mut data = Vec::with_capacity(total);
        let mut offsets = IndexMap::with_capacity(blocks.len());
        for (r, bytes) in blocks {
            offsets.insert(*r, (data.len(), bytes.len()));
            data.extend_from_slice(bytes);
        }

        Self {
            data,
            blocks: offsets,
        }
    }

    /// Read a block.
    pub fn read(&self, r: ResourceRef) -> Option<&[u8]> {
        let &(offset, len) = self.blocks.get(&r)?;
        Some(&self.data[offset..offset + len])
    }

    /// Read the bytes behind a range produced by [`ImmutableStore::entry`].
    pub fn bytes(&self, range: &BufferRange) -> Option<&[u8]> {
        self.data.get(range.as_usize_range())
    }

    /// Whether the store holds any block for `zone`.
    pub fn contains_zone(&self, zone: ZoneId) -> bool {
        self.blocks.keys().any(|r| r.zone == zone)
    }

    /// Distinct zones in registration order.
    pub fn zones(&self) -> Vec<ZoneId> {
        let mut zones: Vec<ZoneId> = Vec::new();
        for r in self.blocks.keys() {
            if !zones.contains(&r.zone) {
                zones.push(r.zone);
            }
        }
        zones
    }

    /// Directory entry describing `zone`'s blocks as store offsets.
    ///
    /// Ranges carry generation 0 forever.
    pub fn entry(&self, zone: ZoneId) -> ZoneEntry {
        let mut entry = ZoneEntry::ABSENT;
        for kind in BufferKind::ALL {
            if let Some(&(offset, len)) = self.blocks.get(&ResourceRef::new(zone, kind)) {
                entry.set(kind, Some(store_range(offset, len)));
            }
        }
        entry
    }

    /// Total memory usage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len()
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Wrap this store in an `Arc` for sharing.
    pub fn into_shared(self) -> SharedImmutableStore {
        Arc::new(self)
    }
}

/// Store offsets as a generation-0 range.
///
/// # Panics
///
/// Panics if the block ends beyond `u32::MAX`.
fn store_range(offset: usize, len: usize) -> BufferRange {
    let end = offset.checked_add(len).and_then(|end| u32::try_from(end).ok());
    let Some(end) = end else {
        panic!("immutable block at {offset}+{len} exceeds u32 offsets");
    };
    // start <= end, so it fits as well.
    BufferRange::new(end - len as u32, end, Generation(0))
}
