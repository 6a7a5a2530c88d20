use bevy::prelude::*;
use crate::interaction::ActiveZone;
use crate::quests::QuestLedger;
use crate::shared::*;
use super::{text_font, UiFontHandle};

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

/// "[E] Interact with ..." while the player stands in a zone.
#[derive(Component)]
pub struct HudInteractPrompt;

#[derive(Component)]
pub struct HudQuestText;

// ═══════════════════════════════════════════════════════════════════════
// SPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_hud(mut commands: Commands, font_handle: Res<UiFontHandle>) {
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            Visibility::Hidden,
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            // Top-left: quest checklist
            parent.spawn((
                HudQuestText,
                Text::new(""),
                text_font(&font_handle, 18.0),
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    left: Val::Px(16.0),
                    top: Val::Px(12.0),
                    padding: UiRect::all(Val::Px(8.0)),
                    ..default()
                },
                BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.55)),
            ));

            // Bottom-center: interact prompt
            parent
                .spawn(Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(48.0),
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                })
                .with_children(|row| {
                    row.spawn((
                        HudInteractPrompt,
                        Text::new(""),
                        text_font(&font_handle, 22.0),
                        TextColor(Color::srgb(1.0, 0.95, 0.7)),
                    ));
                });
        });
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn update_interact_prompt(
    active: Res<ActiveZone>,
    mut query: Query<&mut Text, With<HudInteractPrompt>>,
) {
    if !active.is_changed() {
        return;
    }
    let prompt = active.prompt().unwrap_or_default();
    for mut text in &mut query {
        **text = prompt.clone();
    }
}

/// One line per requirement, checked off as the ledger fills in.
pub fn quest_checklist(ledger: &QuestLedger) -> String {
    let check = |done: bool| if done { "[x]" } else { "[ ]" };
    [
        format!(
            "{} Catch up with friends ({}/{})",
            check(ledger.all_npcs_visited()),
            ledger.visited_count(),
            ledger.tracked_count()
        ),
        format!("{} Pass the archery range", check(ledger.archery_passed())),
        format!("{} Pull a 5 star at the shrine", check(ledger.top_tier_pulled())),
    ]
    .join("\n")
}

pub fn update_quest_progress(
    ledger: Res<QuestLedger>,
    mut query: Query<&mut Text, With<HudQuestText>>,
) {
    if !ledger.is_changed() {
        return;
    }
    let checklist = quest_checklist(&ledger);
    for mut text in &mut query {
        **text = checklist.clone();
    }
}

pub fn update_hud_visibility(
    state: Res<State<GameState>>,
    mut query: Query<&mut Visibility, With<HudRoot>>,
) {
    if !state.is_changed() {
        return;
    }
    let shown = matches!(state.get(), GameState::Overworld | GameState::Dialogue);
    for mut visibility in &mut query {
        *visibility = if shown {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}
