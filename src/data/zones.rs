use bevy::prelude::*;

use crate::dialogue::NpcRegistry;
use crate::interaction::ZoneRegistry;
use crate::shared::*;

pub const PORTAL_ANCHOR: Vec2 = Vec2::new(170.0, 620.0);
pub const ARCHERY_ANCHOR: Vec2 = Vec2::new(380.0, 460.0);
pub const GACHA_ANCHOR: Vec2 = Vec2::new(870.0, 390.0);

/// NPC zones first, in roster order, then the portal and the two minigame
/// entrances. Where radii overlap the later zone takes the prompt.
pub fn populate_zones(zones: &mut ZoneRegistry, npcs: &NpcRegistry) {
    zones.zones.clear();
    for profile in npcs.npcs.values() {
        zones.push(Interactable::Npc(profile.id), profile.anchor);
    }
    zones.push(Interactable::Portal, PORTAL_ANCHOR);
    zones.push(Interactable::ArcheryRange, ARCHERY_ANCHOR);
    zones.push(Interactable::GachaShrine, GACHA_ANCHOR);
}
