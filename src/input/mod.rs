use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<InputContext>()
            .init_resource::<KeyBindings>()
            .add_systems(
                PreUpdate,
                (reset_and_read_input, manage_input_context).chain(),
            );
    }
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub interact: KeyCode,
    pub advance: KeyCode,
    pub secondary: KeyCode,
    pub cancel: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            interact: KeyCode::KeyE,
            advance: KeyCode::Space,
            secondary: KeyCode::KeyQ,
            cancel: KeyCode::Escape,
        }
    }
}

const CHOICE_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    bindings: Res<KeyBindings>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}

        InputContext::Overworld => {
            let mut axis = Vec2::ZERO;
            if keys.pressed(bindings.move_up) || keys.pressed(KeyCode::ArrowUp) {
                axis.y += 1.0;
            }
            if keys.pressed(bindings.move_down) || keys.pressed(KeyCode::ArrowDown) {
                axis.y -= 1.0;
            }
            if keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft) {
                axis.x -= 1.0;
            }
            if keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight) {
                axis.x += 1.0;
            }
            input.move_axis = axis.normalize_or_zero();
            input.interact = keys.just_pressed(bindings.interact);
        }

        InputContext::Dialogue => {
            input.advance = keys.just_pressed(bindings.advance);
            input.secondary = keys.just_pressed(bindings.secondary);
            input.cancel = keys.just_pressed(bindings.cancel);
            input.select_choice = CHOICE_KEYS.iter().position(|key| keys.just_pressed(*key));
        }

        InputContext::Minigame => {
            input.advance = keys.just_pressed(bindings.advance);
            input.secondary = keys.just_pressed(bindings.secondary);
            if mouse.just_pressed(MouseButton::Left) {
                input.pointer = windows.get_single().ok().and_then(|window| {
                    let size = Vec2::new(window.width(), window.height());
                    window
                        .cursor_position()
                        .map(|cursor| window_to_map(cursor, size))
                });
            }
        }
    }
}

/// Derives InputContext from GameState. ONE system, replaces all per-domain guards.
fn manage_input_context(game_state: Res<State<GameState>>, mut context: ResMut<InputContext>) {
    *context = match *game_state.get() {
        GameState::Loading | GameState::Ending => InputContext::Disabled,
        GameState::Overworld => InputContext::Overworld,
        GameState::Dialogue => InputContext::Dialogue,
        GameState::Archery | GameState::Gacha => InputContext::Minigame,
    };
}
