//! Circular resource zone arena for the Reel playback engine.
//!
//! Decoded resource blocks (frame data, overlay graphics, sound effects)
//! share one fixed-size byte arena. Allocation walks a single cursor
//! around the arena and reuses memory by evicting zones, but never
//! hands out memory still read by an on-screen sprite.
//!
//! # Architecture
//!
//! ```text
//! ZoneAllocator (single owner, &mut self)
//! ├── ResourceArena (Vec<u8> + base/end/cursor/frozen/real floors)
//! ├── ZoneDirectory (ZoneId → ZoneEntry { primary, secondary, audio })
//! ├── pinned: Option<ZoneId> (never evicted)
//! ├── Arc<ImmutableStore> (ROM-resident zones, outside the arena)
//! └── AllocMetrics
//! ```
//!
//! The active-sprite registry is not owned: it is borrowed read-only for
//! the duration of each [`ZoneAllocator::allocate`] call.
//!
//! # Allocation
//!
//! First fit from the cursor with linear retry. A candidate that runs
//! past the arena end wraps to the base; a candidate overlapping the
//! pinned zone or any zone read by an active sprite moves the cursor to
//! the end of the first overlapping range. A committed candidate evicts
//! every other directory entry it overlaps.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod allocator;
pub mod arena;
pub mod config;
pub mod directory;
pub mod error;
pub mod immutable;
pub mod liveness;
pub mod metrics;
pub mod range;

// Public re-exports for the primary API surface.
pub use allocator::ZoneAllocator;
pub use arena::ResourceArena;
pub use config::ArenaConfig;
pub use directory::{Eviction, ZoneDirectory, ZoneEntry, ZoneResidency};
pub use error::ArenaError;
pub use immutable::{ImmutableStore, SharedImmutableStore};
pub use metrics::AllocMetrics;
pub use range::BufferRange;
