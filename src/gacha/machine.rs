//! Pull playback: `Idle → Presenting → RevealingPrize → Idle`.
//!
//! One input drives every transition: from `Idle` it pulls, while a
//! presentation plays it skips to the prize, and on the prize it
//! releases back to `Idle`. Anything else is ignored.

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

use super::engine::*;
use crate::config::ShrineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachinePhase {
    Idle,
    Presenting,
    RevealingPrize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MachineEvent {
    Pulled(PullRecord),
    PresentationEnded { skipped: bool },
    PrizeShown(Reward),
    Released,
}

#[derive(Debug)]
enum MachineState {
    Idle,
    Presenting {
        presentation: Option<Presentation>,
        reward: Option<Reward>,
        playback: Timer,
    },
    RevealingPrize {
        reward: Option<Reward>,
        dwell: Timer,
        shown: bool,
    },
}

#[derive(Resource, Debug)]
pub struct GachaMachine {
    table: PullTable,
    dwell: Duration,
    pulls_since_reset: u32,
    last_pull: Option<PullRecord>,
    state: MachineState,
}

impl Default for GachaMachine {
    fn default() -> Self {
        Self::new(PullTable::default(), Duration::from_secs(7))
    }
}

impl GachaMachine {
    pub fn new(table: PullTable, dwell: Duration) -> Self {
        Self {
            table,
            dwell,
            pulls_since_reset: 0,
            last_pull: None,
            state: MachineState::Idle,
        }
    }

    pub fn from_config(config: &ShrineConfig) -> Self {
        Self::new(
            PullTable::from_config(config),
            Duration::from_secs_f32(config.prize_dwell_secs.max(0.0)),
        )
    }

    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        catalog: &GachaCatalog,
        rng: &mut R,
    ) -> Option<MachineEvent> {
        match std::mem::replace(&mut self.state, MachineState::Idle) {
            MachineState::Idle => Some(self.pull(catalog, rng)),
            MachineState::Presenting { reward, .. } => {
                self.reveal(reward);
                Some(MachineEvent::PresentationEnded { skipped: true })
            }
            MachineState::RevealingPrize { .. } => Some(MachineEvent::Released),
        }
    }

    pub fn tick(&mut self, dt: Duration) -> Option<MachineEvent> {
        match &mut self.state {
            MachineState::Idle => return None,
            MachineState::Presenting { playback, .. } => {
                if !playback.tick(dt).finished() {
                    return None;
                }
            }
            MachineState::RevealingPrize {
                reward,
                dwell,
                shown,
                ..
            } => {
                if *shown || !dwell.tick(dt).finished() {
                    return None;
                }
                *shown = true;
                return reward.clone().map(MachineEvent::PrizeShown);
            }
        }

        if let MachineState::Presenting { reward, .. } =
            std::mem::replace(&mut self.state, MachineState::Idle)
        {
            self.reveal(reward);
        }
        Some(MachineEvent::PresentationEnded { skipped: false })
    }

    /// Drops any playback and prize without pulling.
    pub fn release(&mut self) {
        if !matches!(self.state, MachineState::Idle) {
            debug!("[Gacha] playback released");
        }
        self.state = MachineState::Idle;
    }

    pub fn phase(&self) -> MachinePhase {
        match self.state {
            MachineState::Idle => MachinePhase::Idle,
            MachineState::Presenting { .. } => MachinePhase::Presenting,
            MachineState::RevealingPrize { .. } => MachinePhase::RevealingPrize,
        }
    }

    pub fn pulls_since_reset(&self) -> u32 {
        self.pulls_since_reset
    }

    pub fn last_pull(&self) -> Option<PullRecord> {
        self.last_pull
    }

    pub fn current_presentation(&self) -> Option<&Presentation> {
        match &self.state {
            MachineState::Presenting { presentation, .. } => presentation.as_ref(),
            _ => None,
        }
    }

    /// The prize, once its dwell has elapsed.
    pub fn revealed_prize(&self) -> Option<&Reward> {
        match &self.state {
            MachineState::RevealingPrize {
                reward,
                shown: true,
                ..
            } => reward.as_ref(),
            _ => None,
        }
    }

    fn pull<R: Rng + ?Sized>(&mut self, catalog: &GachaCatalog, rng: &mut R) -> MachineEvent {
        self.pulls_since_reset += 1;
        let record = self.table.pull(rng, self.pulls_since_reset);
        if record.tier == Tier::Rare {
            self.pulls_since_reset = 0;
        }
        self.last_pull = Some(record);

        let presentation = catalog.pick_presentation(record.tier, rng).cloned();
        let reward = catalog.rewards.pick(record.tier, rng).cloned();
        if reward.is_none() {
            warn!("[Gacha] no {} prize to show", record.tier.label());
        }
        let length = presentation
            .as_ref()
            .map_or(Duration::ZERO, Presentation::effective_duration);

        info!(
            "[Gacha] pull #{} → {} ({})",
            record.pull_index,
            record.tier.label(),
            presentation.as_ref().map_or("no presentation", |p| p.name.as_str()),
        );

        self.state = MachineState::Presenting {
            presentation,
            reward,
            playback: Timer::new(length, TimerMode::Once),
        };
        MachineEvent::Pulled(record)
    }

    fn reveal(&mut self, reward: Option<Reward>) {
        self.state = MachineState::RevealingPrize {
            reward,
            dwell: Timer::new(self.dwell, TimerMode::Once),
            shown: false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> GachaCatalog {
        let presentation = |name: &str, tier, base_secs, playback_rate| Presentation {
            name: name.to_string(),
            video: format!("{name}.mp4"),
            tier,
            base_secs,
            playback_rate,
        };
        GachaCatalog {
            presentations: vec![
                presentation("common", Tier::Common, 4.0, 2.0),
                presentation("rare", Tier::Rare, 10.0, 1.0),
            ],
            rewards: RewardPools {
                common: vec![Reward::new("dumplings", "dumplings.png")],
                rare: vec![Reward::new("risu", "risu.png")],
            },
        }
    }

    /// A generator whose every `f64` draw is 0.0: always Common off pity.
    fn low_rolls() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn test_full_cycle_with_natural_finish() {
        let catalog = catalog();
        let mut machine = GachaMachine::default();
        let mut rng = low_rolls();

        let event = machine.advance(&catalog, &mut rng);
        assert_eq!(
            event,
            Some(MachineEvent::Pulled(PullRecord {
                tier: Tier::Common,
                pull_index: 1
            }))
        );
        assert_eq!(machine.phase(), MachinePhase::Presenting);

        // 4s at rate 2.0 plays for 2s.
        assert_eq!(machine.tick(Duration::from_millis(1900)), None);
        assert_eq!(
            machine.tick(Duration::from_millis(100)),
            Some(MachineEvent::PresentationEnded { skipped: false })
        );
        assert_eq!(machine.phase(), MachinePhase::RevealingPrize);
        assert_eq!(machine.revealed_prize(), None);

        assert_eq!(machine.tick(Duration::from_millis(6900)), None);
        assert_eq!(
            machine.tick(Duration::from_millis(100)),
            Some(MachineEvent::PrizeShown(Reward::new("dumplings", "dumplings.png")))
        );
        assert_eq!(machine.tick(Duration::from_secs(10)), None);
        assert!(machine.revealed_prize().is_some());

        assert_eq!(machine.advance(&catalog, &mut rng), Some(MachineEvent::Released));
        assert_eq!(machine.phase(), MachinePhase::Idle);
    }

    #[test]
    fn test_skip_enters_reveal_and_dwell_starts_then() {
        let catalog = catalog();
        let mut machine = GachaMachine::default();
        let mut rng = low_rolls();
        machine.advance(&catalog, &mut rng);
        machine.tick(Duration::from_millis(500));
        assert!(machine.current_presentation().is_some());

        assert_eq!(
            machine.advance(&catalog, &mut rng),
            Some(MachineEvent::PresentationEnded { skipped: true })
        );
        assert_eq!(machine.phase(), MachinePhase::RevealingPrize);
        assert!(machine.current_presentation().is_none());
        // The 7s dwell counts from the skip, not from the pull.
        assert_eq!(machine.tick(Duration::from_millis(6500)), None);
        assert!(matches!(
            machine.tick(Duration::from_millis(500)),
            Some(MachineEvent::PrizeShown(_))
        ));
    }

    #[test]
    fn test_release_mid_presentation_returns_to_idle() {
        let catalog = catalog();
        let mut machine = GachaMachine::default();
        machine.advance(&catalog, &mut low_rolls());
        machine.release();
        assert_eq!(machine.phase(), MachinePhase::Idle);
        assert_eq!(machine.tick(Duration::from_secs(60)), None);
    }

    #[test]
    fn test_sixth_pull_is_rare_and_counter_restarts() {
        let catalog = catalog();
        let mut machine = GachaMachine::default();
        let mut rng = low_rolls();
        let mut tiers = Vec::new();
        for _ in 0..6 {
            if let Some(MachineEvent::Pulled(record)) = machine.advance(&catalog, &mut rng) {
                tiers.push(record.tier);
            }
            machine.advance(&catalog, &mut rng);
            machine.advance(&catalog, &mut rng);
        }
        assert_eq!(tiers.len(), 6);
        assert!(tiers[..5].iter().all(|tier| *tier == Tier::Common));
        assert_eq!(tiers[5], Tier::Rare);
        assert_eq!(machine.pulls_since_reset(), 0);
    }

    #[test]
    fn test_pity_holds_for_any_seed() {
        let catalog = catalog();
        for seed in 0..200 {
            let mut machine = GachaMachine::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut saw_rare = false;
            for _ in 0..6 {
                if let Some(MachineEvent::Pulled(record)) = machine.advance(&catalog, &mut rng) {
                    saw_rare |= record.tier == Tier::Rare;
                }
                machine.release();
            }
            assert!(saw_rare, "seed {seed} went six pulls without a Rare");
        }
    }
}
