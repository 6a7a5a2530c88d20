mod movement;
mod spawn;

pub use movement::step_position;
pub use spawn::PLAYER_START;

use bevy::prelude::*;
use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // -- Spawn the player the first time the overworld opens --
        app.add_systems(OnEnter(GameState::Overworld), spawn::spawn_player);

        // -- Movement only while nothing modal is open --
        app.add_systems(
            Update,
            movement::player_movement.run_if(in_state(GameState::Overworld)),
        );

        // -- Transform follows MapPosition in every state --
        app.add_systems(PostUpdate, movement::sync_player_transform);
    }
}
