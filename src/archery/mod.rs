//! Archery range: a timed aim trainer. Click the target; closer to the
//! centre scores more. Reaching the pass score by the end of the round
//! satisfies the range's quest requirement.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use crate::config::ShrineConfig;
use crate::quests::QuestLedger;
use crate::shared::*;

pub struct ArcheryPlugin;

impl Plugin for ArcheryPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<QuestProgressEvent>()
            .add_event::<PlaySfxEvent>()
            .add_systems(OnEnter(GameState::Archery), start_round)
            .add_systems(
                Update,
                (handle_shots, tick_round)
                    .chain()
                    .run_if(in_state(GameState::Archery)),
            )
            .add_systems(OnExit(GameState::Archery), end_round);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SCORING
// ═══════════════════════════════════════════════════════════════════════

/// Outer ring radius; shots beyond it miss.
pub const TARGET_RADIUS: f32 = 32.0;
pub const TARGET_MIN: Vec2 = Vec2::new(400.0, 400.0);
pub const TARGET_MAX: Vec2 = Vec2::new(1200.0, 700.0);

/// Ring points: bullseye (<10 px) 10, middle (<20 px) 3, outer (<32 px) 1.
pub fn score_shot(target: Vec2, shot: Vec2) -> u32 {
    let distance = target.distance(shot);
    if distance < 10.0 {
        10
    } else if distance < 20.0 {
        3
    } else if distance < TARGET_RADIUS {
        1
    } else {
        0
    }
}

pub fn random_target<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::new(
        rng.gen_range(TARGET_MIN.x..=TARGET_MAX.x),
        rng.gen_range(TARGET_MIN.y..=TARGET_MAX.y),
    )
}

// ═══════════════════════════════════════════════════════════════════════
// ROUND
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotOutcome {
    pub at: Vec2,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    Ended { score: u32, passed: bool },
    ResultDismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Shooting,
    Result { passed: bool },
}

#[derive(Resource, Debug)]
pub struct ArcheryRound {
    pub score: u32,
    pub target: Vec2,
    pub last_shot: Option<ShotOutcome>,
    pass_score: u32,
    clock: Timer,
    result_linger: Duration,
    result: Option<(bool, Timer)>,
}

impl ArcheryRound {
    pub fn new<R: Rng + ?Sized>(config: &ShrineConfig, rng: &mut R) -> Self {
        Self {
            score: 0,
            target: random_target(rng),
            last_shot: None,
            pass_score: config.archery_pass_score,
            clock: Timer::from_seconds(config.archery_round_secs.max(0.0), TimerMode::Once),
            result_linger: Duration::from_secs_f32(config.archery_result_secs.max(0.0)),
            result: None,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        match &self.result {
            None => RoundPhase::Shooting,
            Some((passed, _)) => RoundPhase::Result { passed: *passed },
        }
    }

    /// Whole seconds left on the clock, rounded up like a countdown.
    pub fn seconds_left(&self) -> u32 {
        self.clock.remaining_secs().ceil() as u32
    }

    /// A hit scores and moves the target. Shots after time is up are ignored.
    pub fn shoot<R: Rng + ?Sized>(&mut self, at: Vec2, rng: &mut R) -> Option<ShotOutcome> {
        if self.result.is_some() {
            return None;
        }
        let points = score_shot(self.target, at);
        if points > 0 {
            self.score += points;
            self.target = random_target(rng);
        }
        let outcome = ShotOutcome { at, points };
        self.last_shot = Some(outcome);
        Some(outcome)
    }

    pub fn tick(&mut self, dt: Duration) -> Option<RoundEvent> {
        if let Some((_, linger)) = &mut self.result {
            if linger.finished() {
                return None;
            }
            return linger
                .tick(dt)
                .just_finished()
                .then_some(RoundEvent::ResultDismissed);
        }

        if !self.clock.tick(dt).finished() {
            return None;
        }
        let passed = self.score >= self.pass_score;
        self.result = Some((passed, Timer::new(self.result_linger, TimerMode::Once)));
        Some(RoundEvent::Ended {
            score: self.score,
            passed,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn start_round(mut commands: Commands, config: Res<ShrineConfig>) {
    let round = ArcheryRound::new(&config, &mut rand::thread_rng());
    info!(
        "[Archery] round started: {}s to score {}",
        config.archery_round_secs, config.archery_pass_score
    );
    commands.insert_resource(round);
}

pub fn handle_shots(
    input: Res<PlayerInput>,
    round: Option<ResMut<ArcheryRound>>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let (Some(mut round), Some(pointer)) = (round, input.pointer) else {
        return;
    };
    if let Some(shot) = round.shoot(pointer, &mut rand::thread_rng()) {
        let sfx_id = if shot.points > 0 { "arrow_hit" } else { "arrow_miss" };
        sfx.send(PlaySfxEvent {
            sfx_id: sfx_id.to_string(),
        });
    }
}

pub fn tick_round(
    time: Res<Time>,
    round: Option<ResMut<ArcheryRound>>,
    mut ledger: ResMut<QuestLedger>,
    mut progress: EventWriter<QuestProgressEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(mut round) = round else { return };
    match round.tick(time.delta()) {
        Some(RoundEvent::Ended { score, passed }) => {
            info!("[Archery] round over: {} points, passed: {}", score, passed);
            if passed && ledger.mark_archery_passed() {
                progress.send(QuestProgressEvent {
                    milestone: Milestone::ArcheryPassed,
                });
            }
        }
        Some(RoundEvent::ResultDismissed) => next_state.set(GameState::Overworld),
        None => {}
    }
}

pub fn end_round(mut commands: Commands) {
    commands.remove_resource::<ArcheryRound>();
}
