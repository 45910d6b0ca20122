//! Zone loader for the Reel playback engine.
//!
//! The [`Loader`] sits between the engine and the zone arena. When the
//! engine needs a zone whose buffers are absent from the directory, the
//! loader reads the resource header, allocates each missing buffer,
//! decodes into it, and registers the result. It also owns the scene
//! lifecycle: reset on room transitions, freeze for persistent UI
//! graphics, and binding of ROM-resident zones.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod metrics;

pub use error::LoadError;
pub use loader::Loader;
pub use metrics::LoadMetrics;
