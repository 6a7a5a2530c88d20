use bevy::prelude::*;
use crate::config::ShrineConfig;
use crate::shared::*;

/// One frame of movement in map coordinates. `axis` is y-up like the
/// keyboard, the map is y-down, so vertical input is flipped. The result
/// never leaves the map.
pub fn step_position(position: Vec2, axis: Vec2, speed: f32, dt_secs: f32) -> Vec2 {
    let delta = Vec2::new(axis.x, -axis.y) * speed * dt_secs;
    (position + delta).clamp(Vec2::ZERO, Vec2::new(MAP_WIDTH, MAP_HEIGHT))
}

/// Moves the player at the configured speed from the frame's move axis.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<ShrineConfig>,
    mut query: Query<&mut MapPosition, With<Player>>,
) {
    if input.move_axis == Vec2::ZERO {
        return;
    }
    let Ok(mut position) = query.get_single_mut() else {
        return;
    };
    position.0 = step_position(
        position.0,
        input.move_axis,
        config.player_speed,
        time.delta_secs(),
    );
}

pub fn sync_player_transform(
    mut query: Query<(&MapPosition, &mut Transform), (With<Player>, Changed<MapPosition>)>,
) {
    for (position, mut transform) in &mut query {
        let world = map_to_world(position.0);
        transform.translation.x = world.x;
        transform.translation.y = world.y;
    }
}
