use bevy::prelude::*;
use crate::archery::*;
use crate::shared::*;
use super::{text_font, UiFontHandle};

#[derive(Component)]
pub struct ArcheryScreenRoot;

#[derive(Component)]
pub struct ArcheryScoreText;

#[derive(Component)]
pub struct ArcheryTimerText;

/// "+10" or "Miss" for the latest click.
#[derive(Component)]
pub struct ArcheryShotText;

#[derive(Component)]
pub struct ArcheryTarget;

#[derive(Component)]
pub struct ArcheryResultText;

/// Ring radii from outside in, with their fill colours.
const RINGS: [(f32, Color); 3] = [
    (TARGET_RADIUS, Color::srgb(0.95, 0.95, 0.95)),
    (20.0, Color::srgb(0.2, 0.45, 0.9)),
    (10.0, Color::srgb(0.9, 0.2, 0.2)),
];

fn ring(radius: f32, color: Color) -> (Node, BackgroundColor, BorderRadius) {
    (
        Node {
            width: Val::Px(radius * 2.0),
            height: Val::Px(radius * 2.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            ..default()
        },
        BackgroundColor(color),
        BorderRadius::MAX,
    )
}

/// Places the target's centre on a map point, scaled to the window.
fn target_position(target: Vec2) -> (Val, Val) {
    (
        Val::Percent((target.x - TARGET_RADIUS) / MAP_WIDTH * 100.0),
        Val::Percent((target.y - TARGET_RADIUS) / MAP_HEIGHT * 100.0),
    )
}

pub fn spawn_archery_screen(mut commands: Commands, font_handle: Res<UiFontHandle>) {
    commands
        .spawn((
            ArcheryScreenRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                ..default()
            },
            BackgroundColor(Color::srgb(0.16, 0.24, 0.16)),
        ))
        .with_children(|parent| {
            parent
                .spawn(Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(16.0),
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::SpaceAround,
                    ..default()
                })
                .with_children(|bar| {
                    bar.spawn((
                        ArcheryScoreText,
                        Text::new("Score: 0"),
                        text_font(&font_handle, 28.0),
                        TextColor(Color::WHITE),
                    ));
                    bar.spawn((
                        ArcheryShotText,
                        Text::new(""),
                        text_font(&font_handle, 28.0),
                        TextColor(Color::srgb(1.0, 0.9, 0.5)),
                    ));
                    bar.spawn((
                        ArcheryTimerText,
                        Text::new(""),
                        text_font(&font_handle, 28.0),
                        TextColor(Color::WHITE),
                    ));
                });

            let [outer, middle, inner] = RINGS;
            let (mut node, background, radius) = ring(outer.0, outer.1);
            node.position_type = PositionType::Absolute;
            parent
                .spawn((ArcheryTarget, node, background, radius))
                .with_children(|target| {
                    target.spawn(ring(middle.0, middle.1)).with_children(|m| {
                        m.spawn(ring(inner.0, inner.1));
                    });
                });

            parent
                .spawn(Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(80.0),
                    width: Val::Percent(100.0),
                    justify_content: JustifyContent::Center,
                    ..default()
                })
                .with_children(|row| {
                    row.spawn((
                        ArcheryResultText,
                        Text::new(""),
                        text_font(&font_handle, 40.0),
                        TextColor(Color::srgb(1.0, 0.9, 0.5)),
                    ));
                });
        });
}

pub fn despawn_archery_screen(
    mut commands: Commands,
    query: Query<Entity, With<ArcheryScreenRoot>>,
) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn result_line(phase: RoundPhase, score: u32) -> String {
    match phase {
        RoundPhase::Shooting => String::new(),
        RoundPhase::Result { passed: true } => format!("Passed with {score} points!"),
        RoundPhase::Result { passed: false } => format!("Only {score} points. Try again!"),
    }
}

pub fn update_archery_screen(
    round: Option<Res<ArcheryRound>>,
    mut score: Query<&mut Text, With<ArcheryScoreText>>,
    mut timer: Query<&mut Text, (With<ArcheryTimerText>, Without<ArcheryScoreText>)>,
    mut result: Query<
        &mut Text,
        (
            With<ArcheryResultText>,
            Without<ArcheryTimerText>,
            Without<ArcheryScoreText>,
        ),
    >,
    mut shot: Query<
        &mut Text,
        (
            With<ArcheryShotText>,
            Without<ArcheryResultText>,
            Without<ArcheryTimerText>,
            Without<ArcheryScoreText>,
        ),
    >,
    mut target: Query<(&mut Node, &mut Visibility), With<ArcheryTarget>>,
) {
    let Some(round) = round else { return };

    let score_text = format!("Score: {}", round.score);
    for mut text in &mut score {
        if text.as_str() != score_text {
            **text = score_text.clone();
        }
    }
    let timer_text = format!("Time: {}s", round.seconds_left());
    for mut text in &mut timer {
        if text.as_str() != timer_text {
            **text = timer_text.clone();
        }
    }
    let result_text = result_line(round.phase(), round.score);
    for mut text in &mut result {
        if text.as_str() != result_text {
            **text = result_text.clone();
        }
    }

    let shot_text = match round.last_shot {
        Some(ShotOutcome { points: 0, .. }) => "Miss".to_string(),
        Some(outcome) => format!("+{}", outcome.points),
        None => String::new(),
    };
    for mut text in &mut shot {
        if text.as_str() != shot_text {
            **text = shot_text.clone();
        }
    }

    let shooting = round.phase() == RoundPhase::Shooting;
    let (left, top) = target_position(round.target);
    for (mut node, mut visibility) in &mut target {
        if node.left != left || node.top != top {
            node.left = left;
            node.top = top;
        }
        *visibility = if shooting {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_line_per_phase() {
        assert_eq!(result_line(RoundPhase::Shooting, 12), "");
        assert_eq!(
            result_line(RoundPhase::Result { passed: true }, 55),
            "Passed with 55 points!"
        );
        assert!(result_line(RoundPhase::Result { passed: false }, 20).starts_with("Only 20"));
    }
}
