//! Core types and traits for the Reel resource playback engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the arena, the loader and the renderer
//! boundary: zone and sprite identifiers, buffer kinds, decode errors,
//! the resource source boundary, and the liveness traits the allocator
//! scans.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod source;
pub mod sprite;
pub mod traits;

pub use error::DecodeError;
pub use id::{BufferKind, Generation, ResourceRef, SpriteId, ZoneId};
pub use source::{ResourceHeader, ResourceSource};
pub use sprite::{SpriteDescriptor, SpriteList};
pub use traits::{LiveSprite, SpriteRegistry};
