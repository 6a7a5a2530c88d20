use bevy::prelude::*;
use crate::gacha::*;
use super::{screen_root, text_font, UiFontHandle};

#[derive(Component)]
pub struct GachaScreenRoot;

#[derive(Component)]
pub struct GachaResultText;

/// The presentation being played, or the idle prompt.
#[derive(Component)]
pub struct GachaStageText;

#[derive(Component, Default)]
pub struct GachaPrizeImage {
    shown: Option<String>,
}

#[derive(Component)]
pub struct GachaHintText;

pub fn spawn_gacha_screen(mut commands: Commands, font_handle: Res<UiFontHandle>) {
    commands
        .spawn((
            GachaScreenRoot,
            screen_root(),
            BackgroundColor(Color::srgb(0.12, 0.08, 0.18)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(GACHA_TITLE),
                text_font(&font_handle, 48.0),
                TextColor(Color::srgb(1.0, 0.85, 0.4)),
            ));
            parent.spawn((
                Text::new(GACHA_RULES),
                text_font(&font_handle, 22.0),
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                GachaResultText,
                Text::new(""),
                text_font(&font_handle, 24.0),
                TextColor(Color::srgb(0.7, 0.95, 1.0)),
            ));
            parent.spawn((
                GachaStageText,
                Text::new(""),
                text_font(&font_handle, 28.0),
                TextColor(Color::WHITE),
            ));
            parent.spawn((
                GachaPrizeImage::default(),
                Node {
                    width: Val::Px(360.0),
                    height: Val::Px(360.0),
                    ..default()
                },
                ImageNode::default(),
                Visibility::Hidden,
            ));
            parent.spawn((
                GachaHintText,
                Text::new(""),
                text_font(&font_handle, 18.0),
                TextColor(Color::srgb(0.6, 0.6, 0.6)),
            ));
        });
}

pub fn despawn_gacha_screen(
    mut commands: Commands,
    query: Query<Entity, With<GachaScreenRoot>>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn stage_line(machine: &GachaMachine) -> String {
    match machine.phase() {
        MachinePhase::Idle => String::new(),
        MachinePhase::Presenting => machine
            .current_presentation()
            .map(|p| format!("~ {} ~", p.name))
            .unwrap_or_else(|| "~ pulling ~".to_string()),
        MachinePhase::RevealingPrize => match machine.revealed_prize() {
            Some(reward) => format!("You got: {}", reward.id.replace('_', " ")),
            None => "...".to_string(),
        },
    }
}

fn hint_line(machine: &GachaMachine, display: &GachaDisplay) -> &'static str {
    match machine.phase() {
        MachinePhase::Presenting if display.skip_hint => "[Space] Skip   [Q] Leave",
        MachinePhase::RevealingPrize => "[Space] Continue   [Q] Leave",
        _ => "[Space] Pull   [Q] Leave",
    }
}

pub fn update_gacha_screen(
    machine: Option<Res<GachaMachine>>,
    display: Res<GachaDisplay>,
    asset_server: Res<AssetServer>,
    mut result: Query<&mut Text, With<GachaResultText>>,
    mut stage: Query<&mut Text, (With<GachaStageText>, Without<GachaResultText>)>,
    mut hint: Query<
        &mut Text,
        (
            With<GachaHintText>,
            Without<GachaStageText>,
            Without<GachaResultText>,
        ),
    >,
    mut prize: Query<(&mut GachaPrizeImage, &mut ImageNode, &mut Visibility)>,
) {
    let Some(machine) = machine else { return };
    if !machine.is_changed() && !display.is_changed() {
        return;
    }

    for mut text in &mut result {
        if text.as_str() != display.result {
            **text = display.result.clone();
        }
    }
    let stage_text = stage_line(&machine);
    for mut text in &mut stage {
        if text.as_str() != stage_text {
            **text = stage_text.clone();
        }
    }
    let hint_text = hint_line(&machine, &display);
    for mut text in &mut hint {
        if text.as_str() != hint_text {
            **text = hint_text.to_string();
        }
    }

    let revealed = machine.revealed_prize().map(|reward| reward.image.clone());
    for (mut shown, mut image, mut visibility) in &mut prize {
        if shown.shown == revealed {
            continue;
        }
        match &revealed {
            Some(path) => {
                image.image = asset_server.load(path.clone());
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
        shown.shown = revealed.clone();
    }
}
