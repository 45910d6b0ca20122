//! Test utilities and mock types for Reel development.
//!
//! Provides an in-memory [`ResourceSource`] ([`MemorySource`]) with
//! fault injection and decode accounting, plus a plain mock sprite for
//! registries built from slices.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use reel_core::{
    BufferKind, DecodeError, LiveSprite, ResourceHeader, ResourceRef, ResourceSource, ZoneId,
};

/// Deterministic fill pattern for a block: every byte identifies the
/// zone and kind it belongs to, offset by position.
pub fn pattern_bytes(zone: ZoneId, kind: BufferKind, len: usize) -> Vec<u8> {
    let seed = (zone.0 as u8).wrapping_mul(3).wrapping_add(kind.index() as u8);
    (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
}

/// In-memory resource container.
///
/// Populate with [`insert`](MemorySource::insert) or
/// [`insert_pattern`](MemorySource::insert_pattern); make a block fail to
/// decode with [`fail`](MemorySource::fail).
#[derive(Default)]
pub struct MemorySource {
    blocks: HashMap<ResourceRef, Vec<u8>>,
    failing: HashSet<ResourceRef>,
    decode_calls: Cell<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the decoded bytes of one block.
    pub fn insert(&mut self, zone: ZoneId, kind: BufferKind, bytes: Vec<u8>) {
        self.blocks.insert(ResourceRef::new(zone, kind), bytes);
    }

    /// Store a block of `len` pattern bytes.
    pub fn insert_pattern(&mut self, zone: ZoneId, kind: BufferKind, len: usize) {
        self.insert(zone, kind, pattern_bytes(zone, kind, len));
    }

    /// Make decoding of one block report corruption.
    pub fn fail(&mut self, zone: ZoneId, kind: BufferKind) {
        self.failing.insert(ResourceRef::new(zone, kind));
    }

    /// Let a previously failing block decode again.
    pub fn heal(&mut self, zone: ZoneId, kind: BufferKind) {
        self.failing.remove(&ResourceRef::new(zone, kind));
    }

    /// Number of `decode_into` calls so far.
    pub fn decode_calls(&self) -> usize {
        self.decode_calls.get()
    }

    /// The stored bytes of a block.
    pub fn block(&self, zone: ZoneId, kind: BufferKind) -> Option<&[u8]> {
        self.blocks
            .get(&ResourceRef::new(zone, kind))
            .map(|v| v.as_slice())
    }
}

impl ResourceSource for MemorySource {
    fn header(&self, zone: ZoneId) -> Result<ResourceHeader, DecodeError> {
        let mut header = ResourceHeader::default();
        let mut found = false;
        for kind in BufferKind::ALL {
            if let Some(bytes) = self.blocks.get(&ResourceRef::new(zone, kind)) {
                header = header.with(kind, bytes.len() as u32);
                found = true;
            }
        }
        if found {
            Ok(header)
        } else {
            Err(DecodeError::MissingResource { zone })
        }
    }

    fn decode_into(&self, buf: &mut [u8], resource: ResourceRef) -> Result<(), DecodeError> {
        self.decode_calls.set(self.decode_calls.get() + 1);
        if self.failing.contains(&resource) {
            return Err(DecodeError::Corrupt {
                reason: format!("injected failure for {resource}"),
            });
        }
        let bytes = self
            .blocks
            .get(&resource)
            .ok_or(DecodeError::MissingResource {
                zone: resource.zone,
            })?;
        if bytes.len() < buf.len() {
            return Err(DecodeError::Truncated {
                expected: buf.len(),
                available: bytes.len(),
            });
        }
        buf.copy_from_slice(&bytes[..buf.len()]);
        Ok(())
    }
}

/// A sprite for registries built from plain slices or vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockSprite {
    pub zone: ZoneId,
    pub active: bool,
}

impl MockSprite {
    pub fn active(zone: ZoneId) -> Self {
        Self { zone, active: true }
    }

    pub fn idle(zone: ZoneId) -> Self {
        Self {
            zone,
            active: false,
        }
    }
}

impl LiveSprite for MockSprite {
    fn zone_id(&self) -> ZoneId {
        self.zone
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
