use bevy::prelude::*;
use bevy::state::state::StateTransitionEvent;
use crate::shared::*;

#[derive(Component)]
pub struct ScreenFadeOverlay;

/// Drives the black overlay. A transition snaps it opaque, then it fades out.
#[derive(Resource)]
pub struct ScreenFade {
    pub alpha: f32,
    /// Alpha units per second.
    pub speed: f32,
}

impl Default for ScreenFade {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            speed: 2.5,
        }
    }
}

pub fn spawn_fade_overlay(mut commands: Commands) {
    commands.insert_resource(ScreenFade::default());

    commands.spawn((
        ScreenFadeOverlay,
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.0)),
        GlobalZIndex(100),
        PickingBehavior::IGNORE,
    ));
}

/// Screens that replace the overworld fade in; dialogue opens instantly.
fn fades(state: GameState) -> bool {
    matches!(
        state,
        GameState::Archery | GameState::Gacha | GameState::Ending
    )
}

pub fn trigger_fade_on_transition(
    mut events: EventReader<StateTransitionEvent<GameState>>,
    mut fade: ResMut<ScreenFade>,
) {
    for event in events.read() {
        let (Some(from), Some(to)) = (event.exited, event.entered) else {
            continue;
        };
        if from != to && (fades(from) || fades(to)) {
            fade.alpha = 1.0;
        }
    }
}

pub fn update_fade(
    time: Res<Time>,
    mut fade: ResMut<ScreenFade>,
    mut query: Query<&mut BackgroundColor, With<ScreenFadeOverlay>>,
) {
    if fade.alpha <= 0.0 {
        return;
    }
    fade.alpha = (fade.alpha - fade.speed * time.delta_secs()).max(0.0);
    for mut bg in &mut query {
        bg.0 = Color::srgba(0.0, 0.0, 0.0, fade.alpha);
    }
}
