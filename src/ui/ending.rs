use bevy::prelude::*;
use super::{screen_root, text_font, UiFontHandle};

pub const ENDING_TITLE: &str = "Happy Birthday";
pub const ENDING_MESSAGE: &str = "Congrats on getting one day older, unc.";

#[derive(Component)]
pub struct EndingScreen;

/// Terminal screen. Nothing leaves `Ending`.
pub fn spawn_ending_screen(mut commands: Commands, font_handle: Res<UiFontHandle>) {
    info!("[Ending] portal opened, showing the birthday message");
    commands
        .spawn((
            EndingScreen,
            Node {
                justify_content: JustifyContent::Center,
                ..screen_root()
            },
            BackgroundColor(Color::srgb(0.05, 0.04, 0.1)),
            GlobalZIndex(50),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(ENDING_TITLE),
                text_font(&font_handle, 72.0),
                TextColor(Color::srgb(1.0, 0.8, 0.9)),
            ));
            parent.spawn((
                Text::new(ENDING_MESSAGE),
                text_font(&font_handle, 32.0),
                TextColor(Color::WHITE),
            ));
        });
}
