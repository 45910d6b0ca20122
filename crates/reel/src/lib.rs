//! Reel: a circular resource arena for sprite animation playback.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Reel sub-crates. For most users, adding `reel` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use reel::prelude::*;
//!
//! // A source whose zones each hold one 64-byte primary buffer.
//! struct Flat;
//! impl ResourceSource for Flat {
//!     fn header(&self, _zone: ZoneId) -> Result<ResourceHeader, DecodeError> {
//!         Ok(ResourceHeader::primary(64))
//!     }
//!     fn decode_into(&self, buf: &mut [u8], res: ResourceRef) -> Result<(), DecodeError> {
//!         buf.fill(res.zone.0 as u8);
//!         Ok(())
//!     }
//! }
//!
//! let config = ArenaConfig::new(256).with_zone_count(16);
//! let mut loader = Loader::new(config, Flat).unwrap();
//! let mut sprites = SpriteList::new();
//!
//! loader.ensure_loaded(ZoneId(3), &sprites).unwrap();
//! sprites.spawn(ZoneId(3));
//!
//! // Later loads wrap around the arena but never touch zone 3.
//! for z in 4..12 {
//!     loader.ensure_loaded(ZoneId(z), &sprites).unwrap();
//! }
//! let bytes = loader.read(ZoneId(3), BufferKind::Primary).unwrap().unwrap();
//! assert!(bytes.iter().all(|&b| b == 3));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `reel-core` | IDs, sprite registry traits, resource source trait |
//! | [`arena`] | `reel-arena` | Circular arena, zone directory, allocator |
//! | [`loader`] | `reel-loader` | On-demand zone loading and scene lifecycle |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`reel-core`).
///
/// Contains zone and buffer identifiers, the [`types::SpriteRegistry`]
/// liveness view, and the [`types::ResourceSource`] decoder seam.
pub use reel_core as types;

/// Arena storage and zone directory (`reel-arena`).
///
/// [`arena::ZoneAllocator`] is the entry point; [`arena::ResourceArena`]
/// and [`arena::ZoneDirectory`] are exposed for inspection.
pub use reel_arena as arena;

/// Zone loading (`reel-loader`).
pub use reel_loader as loader;

/// Common imports for typical Reel usage.
///
/// ```rust
/// use reel::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use reel_core::{
        BufferKind, DecodeError, LiveSprite, ResourceHeader, ResourceRef, ResourceSource,
        SpriteId, SpriteList, SpriteRegistry, ZoneId,
    };

    // Arena
    pub use reel_arena::{
        ArenaConfig, ArenaError, BufferRange, ImmutableStore, ZoneAllocator, ZoneEntry,
    };

    // Loader
    pub use reel_loader::{LoadError, Loader};
}
