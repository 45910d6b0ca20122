//! Benchmark profiles for the Reel zone arena.
//!
//! - [`scene_profile`]: arena sized like a typical room with 32 zones
//! - [`churn_sizes`]: deterministic per-zone buffer sizes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use reel_arena::ArenaConfig;
use reel_core::{BufferKind, ResourceHeader, ZoneId};

/// Zones in the reference scene.
pub const SCENE_ZONES: u16 = 32;

/// Arena configuration for the reference scene: 64 KiB, 32 zones.
pub fn scene_profile() -> ArenaConfig {
    ArenaConfig::new(64 * 1024).with_zone_count(SCENE_ZONES)
}

/// Header of zone `zone` in the reference scene.
///
/// Primary sizes spread over 512..4096 bytes; every third zone carries a
/// secondary buffer and every other zone an audio buffer.
pub fn churn_sizes(zone: ZoneId) -> ResourceHeader {
    let i = u32::from(zone.0);
    let mut header = ResourceHeader::primary(512 + (i * 977) % 3584);
    if i % 3 == 0 {
        header = header.with(BufferKind::Secondary, 256);
    }
    if i % 2 == 0 {
        header = header.with(BufferKind::Audio, 128);
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_is_valid() {
        assert!(scene_profile().validate().is_ok());
    }

    #[test]
    fn every_zone_fits_the_scene() {
        let span = scene_profile().max_scene_size();
        for z in 0..SCENE_ZONES {
            assert!(churn_sizes(ZoneId(z)).total_size() < u64::from(span));
        }
    }
}
