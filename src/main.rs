use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use yapanese_shrine::config::{ShrineConfig, CONFIG_PATH};
use yapanese_shrine::shared::*;
use yapanese_shrine::{
    archery, audio, data, dialogue, gacha, input, interaction, player, quests, ui,
};

fn main() {
    let config = ShrineConfig::load_or_default(CONFIG_PATH);

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Yapanese Shrine".into(),
                        resolution: WindowResolution::new(MAP_WIDTH, MAP_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        .insert_resource(config)
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(interaction::InteractionPlugin)
        .add_plugins(dialogue::DialoguePlugin)
        .add_plugins(quests::QuestPlugin)
        .add_plugins(archery::ArcheryPlugin)
        .add_plugins(gacha::GachaPlugin)
        .add_plugins(audio::SoundPlugin)
        .add_plugins(ui::UiPlugin)
        // Data loading
        .add_plugins(data::DataPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
