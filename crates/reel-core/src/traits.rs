//! Liveness traits over the active-sprite registry.

use crate::id::ZoneId;

/// A displayed sprite, as seen by the allocator.
///
/// Only two questions matter for eviction: which zone the sprite reads
/// its data from, and whether it is currently being rendered.
pub trait LiveSprite {
    /// The zone whose buffers this sprite reads.
    fn zone_id(&self) -> ZoneId;

    /// Whether the sprite is currently animating on screen.
    fn is_active(&self) -> bool;
}

/// Read-only view of the active-sprite registry.
///
/// The allocator borrows a registry for the duration of one allocation
/// and scans it in order; it never stores it.
pub trait SpriteRegistry {
    /// Sprite type held by the registry.
    type Sprite: LiveSprite;

    /// All registered sprites, in registry order.
    fn sprites(&self) -> &[Self::Sprite];

    /// Whether any active sprite reads from `zone`.
    fn is_zone_live(&self, zone: ZoneId) -> bool {
        self.sprites()
            .iter()
            .any(|s| s.is_active() && s.zone_id() == zone)
    }
}

impl<S: LiveSprite> SpriteRegistry for [S] {
    type Sprite = S;

    fn sprites(&self) -> &[S] {
        self
    }
}

impl<S: LiveSprite> SpriteRegistry for Vec<S> {
    type Sprite = S;

    fn sprites(&self) -> &[S] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(ZoneId, bool);

    impl LiveSprite for Fixed {
        fn zone_id(&self) -> ZoneId {
            self.0
        }
        fn is_active(&self) -> bool {
            self.1
        }
    }

    #[test]
    fn inactive_sprites_do_not_make_zone_live() {
        let sprites = vec![Fixed(ZoneId(1), false), Fixed(ZoneId(2), true)];
        assert!(!sprites.is_zone_live(ZoneId(1)));
        assert!(sprites.is_zone_live(ZoneId(2)));
        assert!(!sprites.is_zone_live(ZoneId(3)));
    }

    #[test]
    fn slice_registry_preserves_order() {
        let sprites = [Fixed(ZoneId(5), true), Fixed(ZoneId(4), true)];
        let zones: Vec<_> = sprites[..].sprites().iter().map(|s| s.zone_id()).collect();
        assert_eq!(zones, vec![ZoneId(5), ZoneId(4)]);
    }
}
