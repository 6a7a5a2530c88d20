use bevy::prelude::*;
use crate::dialogue::{Conversation, DialogueView, SessionPhase};
use super::{text_font, UiFontHandle};

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct DialogueBoxRoot;

#[derive(Component)]
pub struct DialoguePortrait;

#[derive(Component)]
pub struct DialogueNpcName;

#[derive(Component)]
pub struct DialogueText;

/// The Japanese line under the English one.
#[derive(Component)]
pub struct DialogueSecondaryText;

#[derive(Component)]
pub struct DialogueChoiceText(pub usize);

#[derive(Component)]
pub struct DialoguePrompt;

const CHOICE_KEYS: [&str; 2] = ["[Space]", "[Q]"];

// ═══════════════════════════════════════════════════════════════════════
// SPAWN: once, hidden until a conversation opens
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_dialogue_box(
    mut commands: Commands,
    font_handle: Res<UiFontHandle>,
    asset_server: Res<AssetServer>,
) {
    let dialog_bg = asset_server.load("ui/dialogue_box.png");

    commands
        .spawn((
            DialogueBoxRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::FlexEnd,
                align_items: AlignItems::Center,
                flex_direction: FlexDirection::Column,
                padding: UiRect::bottom(Val::Px(40.0)),
                ..default()
            },
            Visibility::Hidden,
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(1200.0),
                        min_height: Val::Px(220.0),
                        flex_direction: FlexDirection::Row,
                        padding: UiRect::all(Val::Px(24.0)),
                        column_gap: Val::Px(24.0),
                        ..default()
                    },
                    ImageNode {
                        image: dialog_bg,
                        ..default()
                    },
                ))
                .with_children(|panel| {
                    // Left: avatar
                    panel.spawn((
                        DialoguePortrait,
                        Node {
                            width: Val::Px(160.0),
                            height: Val::Px(160.0),
                            ..default()
                        },
                        ImageNode::default(),
                    ));

                    // Right: name, both text channels, choices, prompt
                    panel
                        .spawn(Node {
                            flex_direction: FlexDirection::Column,
                            flex_grow: 1.0,
                            row_gap: Val::Px(8.0),
                            ..default()
                        })
                        .with_children(|text_area| {
                            text_area.spawn((
                                DialogueNpcName,
                                Text::new(""),
                                text_font(&font_handle, 26.0),
                                TextColor(Color::srgb(1.0, 0.9, 0.6)),
                            ));
                            text_area.spawn((
                                DialogueText,
                                Text::new(""),
                                text_font(&font_handle, 24.0),
                                TextColor(Color::WHITE),
                            ));
                            text_area.spawn((
                                DialogueSecondaryText,
                                Text::new(""),
                                text_font(&font_handle, 22.0),
                                TextColor(Color::srgb(0.85, 0.85, 0.95)),
                            ));
                            for index in 0..CHOICE_KEYS.len() {
                                text_area.spawn((
                                    DialogueChoiceText(index),
                                    Text::new(""),
                                    text_font(&font_handle, 22.0),
                                    TextColor(Color::srgb(0.6, 0.9, 1.0)),
                                ));
                            }
                            text_area.spawn((
                                DialoguePrompt,
                                Text::new(""),
                                text_font(&font_handle, 16.0),
                                TextColor(Color::srgb(0.6, 0.6, 0.6)),
                            ));
                        });
                });
        });
}

// ═══════════════════════════════════════════════════════════════════════
// SYNC: copy DialogueView onto the box whenever it changes
// ═══════════════════════════════════════════════════════════════════════

pub fn sync_dialogue_box(
    view: Res<DialogueView>,
    asset_server: Res<AssetServer>,
    mut root: Query<&mut Visibility, With<DialogueBoxRoot>>,
    mut portrait: Query<&mut ImageNode, With<DialoguePortrait>>,
    mut name: Query<&mut Text, With<DialogueNpcName>>,
    mut primary: Query<&mut Text, (With<DialogueText>, Without<DialogueNpcName>)>,
    mut secondary: Query<
        &mut Text,
        (
            With<DialogueSecondaryText>,
            Without<DialogueText>,
            Without<DialogueNpcName>,
        ),
    >,
    mut choices: Query<
        (&mut Text, &DialogueChoiceText),
        (
            Without<DialogueSecondaryText>,
            Without<DialogueText>,
            Without<DialogueNpcName>,
        ),
    >,
) {
    if !view.is_changed() {
        return;
    }

    for mut visibility in &mut root {
        *visibility = if view.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    let speaker = view.speaker.as_ref();
    for mut text in &mut name {
        **text = speaker.map(|s| s.name.clone()).unwrap_or_default();
    }
    for mut image in &mut portrait {
        image.image = speaker
            .and_then(|s| s.avatar.as_deref())
            .map(|path| asset_server.load(path.to_string()))
            .unwrap_or_default();
    }
    for mut text in &mut primary {
        **text = view.primary.clone();
    }
    for mut text in &mut secondary {
        **text = if view.bilingual {
            view.secondary.clone()
        } else {
            String::new()
        };
    }
    for (mut text, choice) in &mut choices {
        **text = match (view.choices.get(choice.0), CHOICE_KEYS.get(choice.0)) {
            (Some(label), Some(key)) => format!("{key} {label}"),
            _ => String::new(),
        };
    }
}

pub fn update_dialogue_prompt(
    conversation: Res<Conversation>,
    mut prompt: Query<&mut Text, With<DialoguePrompt>>,
) {
    if !conversation.is_changed() {
        return;
    }
    let hint = match conversation.session().map(|session| session.phase()) {
        Some(SessionPhase::AwaitingAdvance) => "[Space] Continue   [Esc] Skip",
        Some(SessionPhase::AwaitingChoice) => "[Esc] Back",
        Some(SessionPhase::Revealing) | Some(SessionPhase::PlayingTrack) => "[Esc] Skip",
        Some(SessionPhase::Closed) | None => "",
    };
    for mut text in &mut prompt {
        if text.as_str() != hint {
            **text = hint.to_string();
        }
    }
}
