mod archery_screen;
mod dialogue_box;
mod ending;
mod gacha_screen;
mod hud;
mod toast;
mod transitions;

pub use toast::ToastEvent;

use bevy::prelude::*;
use crate::shared::*;

/// Rendering for every screen. Game logic lives in the domain plugins and
/// never depends on anything here.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ToastEvent>();

        // ─── FONT, MAP BACKGROUND, FADE OVERLAY, always present ───
        app.add_systems(
            Startup,
            (
                load_ui_font,
                spawn_background,
                transitions::spawn_fade_overlay,
            ),
        );
        app.add_systems(
            Update,
            (
                transitions::trigger_fade_on_transition,
                transitions::update_fade,
            )
                .chain(),
        );

        // ─── DIALOGUE BOX, spawned once, shown while a conversation is open ───
        app.add_systems(
            Startup,
            dialogue_box::spawn_dialogue_box.after(load_ui_font),
        );
        app.add_systems(
            Update,
            (
                dialogue_box::sync_dialogue_box,
                dialogue_box::update_dialogue_prompt,
            ),
        );

        // ─── HUD: prompt and quest progress over the overworld ───
        app.add_systems(Startup, hud::spawn_hud.after(load_ui_font));
        app.add_systems(
            Update,
            (
                hud::update_interact_prompt,
                hud::update_quest_progress,
                hud::update_hud_visibility,
            ),
        );

        // ─── TOASTS ───
        app.add_systems(Startup, toast::spawn_toast_container);
        app.add_systems(
            Update,
            (
                toast::wire_quest_toasts,
                toast::handle_toast_events,
                toast::update_toasts,
            )
                .chain(),
        );

        // ─── GACHA SHRINE ───
        app.add_systems(OnEnter(GameState::Gacha), gacha_screen::spawn_gacha_screen);
        app.add_systems(OnExit(GameState::Gacha), gacha_screen::despawn_gacha_screen);
        app.add_systems(
            Update,
            gacha_screen::update_gacha_screen.run_if(in_state(GameState::Gacha)),
        );

        // ─── ARCHERY RANGE ───
        app.add_systems(OnEnter(GameState::Archery), archery_screen::spawn_archery_screen);
        app.add_systems(OnExit(GameState::Archery), archery_screen::despawn_archery_screen);
        app.add_systems(
            Update,
            archery_screen::update_archery_screen.run_if(in_state(GameState::Archery)),
        );

        // ─── ENDING ───
        app.add_systems(OnEnter(GameState::Ending), ending::spawn_ending_screen);
    }
}

#[derive(Resource, Clone)]
pub struct UiFontHandle(pub Handle<Font>);

fn load_ui_font(mut commands: Commands, asset_server: Res<AssetServer>) {
    // Covers kana and kanji; the default font does not.
    let font = asset_server.load("fonts/DotGothic16-Regular.ttf");
    commands.insert_resource(UiFontHandle(font));
}

#[derive(Component)]
pub struct MapBackground;

fn spawn_background(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn((
        MapBackground,
        Sprite {
            image: asset_server.load("images/background.png"),
            custom_size: Some(Vec2::new(MAP_WIDTH, MAP_HEIGHT)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, Z_BACKGROUND),
    ));
}

/// Full-screen root shared by the minigame and ending screens.
pub(crate) fn screen_root() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        padding: UiRect::all(Val::Px(24.0)),
        row_gap: Val::Px(12.0),
        ..default()
    }
}

pub(crate) fn text_font(font: &UiFontHandle, size: f32) -> TextFont {
    TextFont {
        font: font.0.clone(),
        font_size: size,
        ..default()
    }
}
