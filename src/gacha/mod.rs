//! The gacha shrine minigame. [Space] pulls, skips, and dismisses the
//! prize; [Q] leaves at any time. Drawing a Rare satisfies the shrine's
//! quest requirement.

mod engine;
mod machine;

pub use engine::*;
pub use machine::*;

use bevy::prelude::*;

use crate::config::ShrineConfig;
use crate::quests::QuestLedger;
use crate::shared::*;

pub struct GachaPlugin;

impl Plugin for GachaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GachaCatalog>()
            .init_resource::<GachaDisplay>()
            .add_event::<QuestProgressEvent>()
            .add_event::<PlaySfxEvent>()
            .add_systems(OnEnter(GameState::Gacha), enter_shrine)
            .add_systems(
                Update,
                (handle_gacha_input, tick_gacha_machine)
                    .chain()
                    .run_if(in_state(GameState::Gacha)),
            )
            .add_systems(OnExit(GameState::Gacha), leave_shrine);
    }
}

pub const GACHA_TITLE: &str = "Shrine Gacha";
pub const GACHA_RULES: &str = "Goal: get a 5 star! (4 star chance: 90%, 5 star chance: 10%)";
pub const ALREADY_OBTAINED: &str = "You already got a 5 star, you don't need to pull more!";

/// Text the shrine screen shows besides the machine itself.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct GachaDisplay {
    pub result: String,
    pub skip_hint: bool,
}

/// Fresh machine per visit, so the pull counter restarts.
pub fn enter_shrine(
    mut commands: Commands,
    config: Res<ShrineConfig>,
    ledger: Res<QuestLedger>,
    mut display: ResMut<GachaDisplay>,
) {
    commands.insert_resource(GachaMachine::from_config(&config));
    *display = GachaDisplay {
        result: if ledger.top_tier_pulled() {
            ALREADY_OBTAINED.to_string()
        } else {
            String::new()
        },
        skip_hint: false,
    };
    info!("[Gacha] entered the shrine");
}

pub fn handle_gacha_input(
    input: Res<PlayerInput>,
    catalog: Res<GachaCatalog>,
    machine: Option<ResMut<GachaMachine>>,
    mut ledger: ResMut<QuestLedger>,
    mut display: ResMut<GachaDisplay>,
    mut progress: EventWriter<QuestProgressEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(mut machine) = machine else { return };

    if input.secondary {
        machine.release();
        next_state.set(GameState::Overworld);
        return;
    }
    if !input.advance {
        return;
    }

    let already_had_rare = ledger.top_tier_pulled();
    match machine.advance(&catalog, &mut rand::thread_rng()) {
        Some(MachineEvent::Pulled(record)) => {
            let mut result = format!("Your last pull was a {}!", record.tier.label());
            if already_had_rare {
                result.push(' ');
                result.push_str(ALREADY_OBTAINED);
            }
            display.result = result;
            display.skip_hint = true;
            sfx.send(PlaySfxEvent {
                sfx_id: "gacha_pull".to_string(),
            });
            if record.tier == Tier::Rare && ledger.mark_top_tier_pulled() {
                progress.send(QuestProgressEvent {
                    milestone: Milestone::TopTierPulled,
                });
            }
        }
        Some(MachineEvent::Released) => display.skip_hint = false,
        Some(_) | None => {}
    }
}

pub fn tick_gacha_machine(
    time: Res<Time>,
    machine: Option<ResMut<GachaMachine>>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let Some(mut machine) = machine else { return };
    if let Some(MachineEvent::PrizeShown(reward)) = machine.tick(time.delta()) {
        info!("[Gacha] prize revealed: {}", reward.id);
        if machine.last_pull().is_some_and(|pull| pull.tier == Tier::Rare) {
            sfx.send(PlaySfxEvent {
                sfx_id: "prize_rare".to_string(),
            });
        }
    }
}

pub fn leave_shrine(mut commands: Commands, mut display: ResMut<GachaDisplay>) {
    commands.remove_resource::<GachaMachine>();
    display.skip_hint = false;
    info!("[Gacha] left the shrine");
}
