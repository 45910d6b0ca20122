//! A concrete active-sprite registry.
//!
//! [`SpriteList`] is the registry the animation scheduler owns: sprites
//! are spawned against a zone, toggled active while they animate, and
//! retired when they leave the screen. Registry order is spawn order,
//! which is also the order the allocator's liveness scan uses.

use smallvec::SmallVec;

use crate::id::{SpriteId, ZoneId};
use crate::traits::{LiveSprite, SpriteRegistry};

/// One displayed sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteDescriptor {
    /// Scheduler-assigned identity.
    pub id: SpriteId,
    /// Zone whose buffers the sprite reads.
    pub zone: ZoneId,
    /// Whether the sprite is currently animating.
    pub active: bool,
}

impl LiveSprite for SpriteDescriptor {
    fn zone_id(&self) -> ZoneId {
        self.zone
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Ordered list of spawned sprites.
#[derive(Clone, Debug, Default)]
pub struct SpriteList {
    sprites: Vec<SpriteDescriptor>,
    next_id: u32,
}

impl SpriteList {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an active sprite reading from `zone`.
    pub fn spawn(&mut self, zone: ZoneId) -> SpriteId {
        let id = SpriteId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.sprites.push(SpriteDescriptor {
            id,
            zone,
            active: true,
        });
        id
    }

    /// Remove a sprite. Returns `false` if it was not registered.
    ///
    /// Order of the remaining sprites is preserved.
    pub fn retire(&mut self, id: SpriteId) -> bool {
        match self.sprites.iter().position(|s| s.id == id) {
            Some(pos) => {
                self.sprites.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Pause or resume a sprite. Returns `false` if it was not registered.
    pub fn set_active(&mut self, id: SpriteId, active: bool) -> bool {
        match self.sprites.iter_mut().find(|s| s.id == id) {
            Some(sprite) => {
                sprite.active = active;
                true
            }
            None => false,
        }
    }

    /// Look up a sprite.
    pub fn get(&self, id: SpriteId) -> Option<&SpriteDescriptor> {
        self.sprites.iter().find(|s| s.id == id)
    }

    /// Number of registered sprites (active or not).
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Whether no sprites are registered.
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Remove every sprite.
    pub fn clear(&mut self) {
        self.sprites.clear();
    }

    /// Distinct zones read by active sprites, in first-seen order.
    pub fn live_zones(&self) -> SmallVec<[ZoneId; 8]> {
        let mut zones: SmallVec<[ZoneId; 8]> = SmallVec::new();
        for sprite in self.sprites.iter().filter(|s| s.active) {
            if !zones.contains(&sprite.zone) {
                zones.push(sprite.zone);
            }
        }
        zones
    }
}

impl SpriteRegistry for SpriteList {
    type Sprite = SpriteDescriptor;

    fn sprites(&self) -> &[SpriteDescriptor] {
        &self.sprites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_assigns_sequential_ids() {
        let mut list = SpriteList::new();
        let a = list.spawn(ZoneId(1));
        let b = list.spawn(ZoneId(2));
        assert_eq!(a, SpriteId(0));
        assert_eq!(b, SpriteId(1));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn retire_keeps_order() {
        let mut list = SpriteList::new();
        let a = list.spawn(ZoneId(1));
        list.spawn(ZoneId(2));
        list.spawn(ZoneId(3));
        assert!(list.retire(a));
        assert!(!list.retire(a));
        let zones: Vec<_> = list.sprites().iter().map(|s| s.zone).collect();
        assert_eq!(zones, vec![ZoneId(2), ZoneId(3)]);
    }

    #[test]
    fn paused_sprite_is_not_live() {
        let mut list = SpriteList::new();
        let a = list.spawn(ZoneId(4));
        assert!(list.is_zone_live(ZoneId(4)));
        assert!(list.set_active(a, false));
        assert!(!list.is_zone_live(ZoneId(4)));
        assert!(!list.get(a).unwrap().active);
    }

    #[test]
    fn live_zones_are_deduplicated() {
        let mut list = SpriteList::new();
        list.spawn(ZoneId(3));
        let paused = list.spawn(ZoneId(9));
        list.spawn(ZoneId(1));
        list.spawn(ZoneId(3));
        list.set_active(paused, false);
        assert_eq!(list.live_zones().as_slice(), &[ZoneId(3), ZoneId(1)]);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn live_zones_match_active_sprites(
                ops in prop::collection::vec((0u16..6, any::<bool>(), any::<bool>()), 0..64),
            ) {
                let mut list = SpriteList::new();
                let mut ids = Vec::new();
                for (zone, retire_one, pause) in ops {
                    let id = list.spawn(ZoneId(zone));
                    ids.push(id);
                    if pause {
                        list.set_active(id, false);
                    }
                    if retire_one && ids.len() > 1 {
                        let victim = ids.remove(0);
                        prop_assert!(list.retire(victim));
                    }
                }

                let live = list.live_zones();
                for z in 0..6u16 {
                    prop_assert_eq!(live.contains(&ZoneId(z)), list.is_zone_live(ZoneId(z)));
                }
                let mut dedup = live.to_vec();
                dedup.sort();
                dedup.dedup();
                prop_assert_eq!(dedup.len(), live.len());
                prop_assert_eq!(list.len(), ids.len());
            }
        }
    }
}
