use bevy::prelude::*;
use crate::shared::*;

/// Where the player stands when the overworld first opens, just below the
/// torii.
pub const PLAYER_START: Vec2 = Vec2::new(950.0, 900.0);

const PLAYER_SIZE: Vec2 = Vec2::new(48.0, 64.0);

/// Spawn the player entity with all necessary components.
/// Runs on every `OnEnter(GameState::Overworld)`.
pub fn spawn_player(
    mut commands: Commands,
    asset_server: Option<Res<AssetServer>>,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: returning from a conversation or minigame keeps the position.
    if !existing.is_empty() {
        return;
    }

    let sprite = match asset_server {
        Some(assets) => Sprite {
            image: assets.load("sprites/player.png"),
            custom_size: Some(PLAYER_SIZE),
            ..default()
        },
        // Placeholder square when running without assets.
        None => Sprite {
            color: Color::srgb(0.2, 0.5, 0.8),
            custom_size: Some(PLAYER_SIZE),
            ..default()
        },
    };
    let world = map_to_world(PLAYER_START);

    commands.spawn((
        Player,
        MapPosition(PLAYER_START),
        sprite,
        Transform::from_translation(world.extend(Z_PLAYER)),
        Visibility::default(),
    ));
    info!("[Player] spawned at {:?}", PLAYER_START);
}
