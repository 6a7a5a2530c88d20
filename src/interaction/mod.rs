//! Overworld interaction gate: which interactable the player stands at,
//! and what pressing [E] there does.

use bevy::prelude::*;

use crate::config::ShrineConfig;
use crate::dialogue::{
    ConversationRequest, ConversationScript, DialogueLine, DialogueScript, NpcRegistry, Speaker,
};
use crate::quests::QuestLedger;
use crate::shared::*;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ZoneRegistry>()
            .init_resource::<ActiveZone>()
            .add_event::<ConversationRequest>()
            .add_event::<PlaySfxEvent>()
            .add_systems(
                Update,
                (update_active_zone, handle_interact)
                    .chain()
                    .run_if(in_state(GameState::Overworld)),
            )
            .add_systems(OnExit(GameState::Overworld), clear_active_zone);
    }
}

/// Who explains what is still missing when the portal is locked.
pub const GATEKEEPER_NAME: &str = "Risu";
pub const GATEKEEPER_AVATAR: &str = "avatars/risu.png";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractZone {
    pub kind: Interactable,
    /// Map coordinates.
    pub anchor: Vec2,
}

/// Zones in registration order. Order matters where radii overlap.
#[derive(Resource, Debug, Clone, Default)]
pub struct ZoneRegistry {
    pub zones: Vec<InteractZone>,
}

impl ZoneRegistry {
    pub fn push(&mut self, kind: Interactable, anchor: Vec2) {
        self.zones.push(InteractZone { kind, anchor });
    }

    pub fn anchor_of(&self, kind: Interactable) -> Option<Vec2> {
        self.zones.iter().find(|z| z.kind == kind).map(|z| z.anchor)
    }
}

/// The interactable [E] would act on this frame, if any.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveZone(pub Option<Interactable>);

impl ActiveZone {
    pub fn prompt(&self) -> Option<String> {
        self.0
            .map(|kind| format!("[E] Interact with {}", kind.label()))
    }
}

pub fn capture_radius(kind: Interactable, config: &ShrineConfig) -> f32 {
    if kind.is_minigame_entrance() {
        config.minigame_radius
    } else {
        config.npc_radius
    }
}

/// Every zone whose radius contains the player is a candidate; the last
/// one registered wins.
pub fn find_active_zone(
    zones: &[InteractZone],
    player: Vec2,
    config: &ShrineConfig,
) -> Option<Interactable> {
    zones
        .iter()
        .filter(|zone| zone.anchor.distance(player) < capture_radius(zone.kind, config))
        .last()
        .map(|zone| zone.kind)
}

/// What pressing [E] on a zone leads to.
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    Converse(ConversationScript),
    Enter(GameState),
    /// The portal with every requirement met. One way.
    Exit,
}

pub fn missing_requirement_script(text: BilingualText) -> ConversationScript {
    ConversationScript::Lines(DialogueScript::new(
        Speaker::new(GATEKEEPER_NAME, Some(GATEKEEPER_AVATAR.to_string())),
        vec![DialogueLine::new(text)],
    ))
}

/// `None` only for an NPC with no profile, which registry validation
/// rules out for every NPC that has a zone.
pub fn resolve_interaction(
    kind: Interactable,
    ledger: &QuestLedger,
    registry: &NpcRegistry,
) -> Option<GateOutcome> {
    match kind {
        Interactable::Npc(npc) => registry
            .get(npc)
            .map(|profile| GateOutcome::Converse(ConversationScript::Lines(profile.greeting_script()))),
        Interactable::ArcheryRange => Some(GateOutcome::Enter(GameState::Archery)),
        Interactable::GachaShrine => Some(GateOutcome::Enter(GameState::Gacha)),
        Interactable::Portal => Some(match ledger.missing_requirement() {
            None => GateOutcome::Exit,
            Some(text) => GateOutcome::Converse(missing_requirement_script(text)),
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn update_active_zone(
    config: Res<ShrineConfig>,
    zones: Res<ZoneRegistry>,
    player: Query<&MapPosition, With<Player>>,
    mut active: ResMut<ActiveZone>,
) {
    let Ok(position) = player.get_single() else {
        return;
    };
    let found = find_active_zone(&zones.zones, position.0, &config);
    if active.0 != found {
        debug!("[Gate] active zone: {:?}", found);
        active.0 = found;
    }
}

pub fn handle_interact(
    input: Res<PlayerInput>,
    active: Res<ActiveZone>,
    ledger: Res<QuestLedger>,
    registry: Res<NpcRegistry>,
    mut requests: EventWriter<ConversationRequest>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.interact {
        return;
    }
    let Some(kind) = active.0 else { return };

    match resolve_interaction(kind, &ledger, &registry) {
        Some(GateOutcome::Converse(script)) => {
            info!("[Gate] conversation at {}", kind.label());
            if kind == Interactable::Portal {
                sfx.send(PlaySfxEvent {
                    sfx_id: "error".to_string(),
                });
            }
            requests.send(ConversationRequest { script });
        }
        Some(GateOutcome::Enter(state)) => {
            info!("[Gate] entering {:?}", state);
            next_state.set(state);
        }
        Some(GateOutcome::Exit) => {
            info!("[Gate] every requirement met, taking the portal");
            sfx.send(PlaySfxEvent {
                sfx_id: "portal_open".to_string(),
            });
            next_state.set(GameState::Ending);
        }
        None => warn!("[Gate] {} has nothing to say", kind.label()),
    }
}

fn clear_active_zone(mut active: ResMut<ActiveZone>) {
    active.0 = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> Vec<InteractZone> {
        vec![
            InteractZone {
                kind: Interactable::Npc(NpcId::Levenski),
                anchor: Vec2::new(1380.0, 700.0),
            },
            InteractZone {
                kind: Interactable::Npc(NpcId::Howl),
                anchor: Vec2::new(1400.0, 700.0),
            },
            InteractZone {
                kind: Interactable::ArcheryRange,
                anchor: Vec2::new(380.0, 460.0),
            },
        ]
    }

    #[test]
    fn test_overlapping_radii_pick_last_registered() {
        let config = ShrineConfig::default();
        let found = find_active_zone(&zones(), Vec2::new(1390.0, 700.0), &config);
        assert_eq!(found, Some(Interactable::Npc(NpcId::Howl)));
    }

    #[test]
    fn test_radius_is_exclusive() {
        let config = ShrineConfig::default();
        let zones = zones();
        assert_eq!(find_active_zone(&zones, Vec2::new(1340.0, 700.0), &config), None);
        assert_eq!(
            find_active_zone(&zones, Vec2::new(1341.0, 700.0), &config),
            Some(Interactable::Npc(NpcId::Levenski))
        );
    }

    #[test]
    fn test_minigame_entrance_has_wider_capture() {
        let config = ShrineConfig::default();
        let found = find_active_zone(&zones(), Vec2::new(380.0, 510.0), &config);
        assert_eq!(found, Some(Interactable::ArcheryRange));
    }

    #[test]
    fn test_locked_portal_explains_first_missing_requirement() {
        let mut ledger = QuestLedger::with_required([NpcId::Rintsuki]);
        ledger.mark_top_tier_pulled();
        let outcome = resolve_interaction(Interactable::Portal, &ledger, &NpcRegistry::default());
        let Some(GateOutcome::Converse(ConversationScript::Lines(script))) = outcome else {
            panic!("expected a gatekeeper conversation, got {outcome:?}");
        };
        assert_eq!(script.speaker.name, GATEKEEPER_NAME);
        assert_eq!(
            script.lines[0].text.primary,
            "You still need to complete the Archery Challenge."
        );
    }

    #[test]
    fn test_complete_ledger_opens_portal() {
        let mut ledger = QuestLedger::with_required([NpcId::Rintsuki]);
        ledger.mark_top_tier_pulled();
        ledger.mark_archery_passed();
        ledger.mark_visited(NpcId::Rintsuki);
        assert_eq!(
            resolve_interaction(Interactable::Portal, &ledger, &NpcRegistry::default()),
            Some(GateOutcome::Exit)
        );
    }

    #[test]
    fn test_minigames_and_unknown_npc() {
        let ledger = QuestLedger::default();
        let registry = NpcRegistry::default();
        assert_eq!(
            resolve_interaction(Interactable::GachaShrine, &ledger, &registry),
            Some(GateOutcome::Enter(GameState::Gacha))
        );
        assert_eq!(
            resolve_interaction(Interactable::Npc(NpcId::Mel), &ledger, &registry),
            None
        );
    }

    #[test]
    fn test_prompt_names_the_zone() {
        let active = ActiveZone(Some(Interactable::GachaShrine));
        assert_eq!(active.prompt().as_deref(), Some("[E] Interact with Gacha Shrine"));
        assert_eq!(ActiveZone::default().prompt(), None);
    }
}
