//! Data layer: populates all registries at game startup.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills the NPC roster,
//! the interactable zones and the gacha catalogue from the hard-coded
//! content in submodules, validates all of it, then transitions the game
//! into GameState::Overworld. Content that fails validation stops the app
//! instead: a broken script would otherwise surface mid-conversation.
//!
//! No other domain needs to seed these resources. All domain plugins can
//! safely read them once GameState has advanced past Loading.

mod npcs;
mod rewards;
mod zones;

pub use npcs::populate_npcs;
pub use rewards::populate_catalog;
pub use zones::{populate_zones, ARCHERY_ANCHOR, GACHA_ANCHOR, PORTAL_ANCHOR};

use bevy::prelude::*;
use thiserror::Error;

use crate::config::ShrineConfig;
use crate::dialogue::{NpcRegistry, ScriptError};
use crate::gacha::GachaCatalog;
use crate::interaction::ZoneRegistry;
use crate::quests::QuestLedger;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NpcRegistry>()
            .init_resource::<ZoneRegistry>()
            .init_resource::<GachaCatalog>()
            .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

/// Content that cannot be played as written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    #[error("{npc:?}: {source}")]
    Script {
        npc: NpcId,
        #[source]
        source: ScriptError,
    },
    #[error("{0:?} is required but has no profile")]
    UnknownNpc(NpcId),
    #[error("{npc:?} has an empty text message")]
    EmptyMessage { npc: NpcId },
    #[error("the {tier} reward pool is empty")]
    EmptyRewardPool { tier: &'static str },
    #[error("no {tier} presentation to play")]
    NoPresentations { tier: &'static str },
    #[error("presentation {name} has playback rate {rate}")]
    BadPlaybackRate { name: String, rate: f32 },
}

/// Fills and validates every registry, stopping at the first error.
pub fn populate_all(
    config: &ShrineConfig,
    npc_registry: &mut NpcRegistry,
    zones: &mut ZoneRegistry,
    catalog: &mut GachaCatalog,
) -> Result<(), ContentError> {
    populate_npcs(npc_registry)?;
    npc_registry.validate(&config.required_npcs)?;
    info!("  NPCs loaded: {}", npc_registry.len());

    populate_zones(zones, npc_registry);
    info!("  Zones loaded: {}", zones.zones.len());

    populate_catalog(catalog);
    catalog.validate()?;
    info!(
        "  Gacha loaded: {} presentations, {} + {} prizes",
        catalog.presentations.len(),
        catalog.rewards.common.len(),
        catalog.rewards.rare.len()
    );
    Ok(())
}

/// Single system that populates every registry and then transitions to
/// the overworld, or stops the app if the content is broken.
fn load_all_data(
    mut commands: Commands,
    config: Res<ShrineConfig>,
    mut npc_registry: ResMut<NpcRegistry>,
    mut zones: ResMut<ZoneRegistry>,
    mut catalog: ResMut<GachaCatalog>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: EventWriter<AppExit>,
) {
    info!("DataPlugin: populating registries…");

    if let Err(err) = populate_all(&config, &mut npc_registry, &mut zones, &mut catalog) {
        error!("DataPlugin: invalid game content: {err}");
        exit.send(AppExit::error());
        return;
    }

    commands.insert_resource(QuestLedger::with_required(config.required_npcs.iter().copied()));
    info!("DataPlugin: all registries populated. Transitioning to Overworld.");
    next_state.set(GameState::Overworld);
}
