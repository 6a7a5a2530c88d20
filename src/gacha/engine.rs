//! Weighted reward engine: tier rolls with a pity guarantee, plus the
//! catalogue of prizes and presentations each tier draws from.

use std::time::Duration;

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::ShrineConfig;
use crate::data::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Common,
    Rare,
}

impl Tier {
    pub fn stars(self) -> u8 {
        match self {
            Tier::Common => 4,
            Tier::Rare => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Common => "4★",
            Tier::Rare => "5★",
        }
    }
}

/// Result of one pull. `pull_index` counts from 1 since the last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRecord {
    pub tier: Tier,
    pub pull_index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullTable {
    pub rare_rate: f64,
    /// The pull index on which a Rare is forced.
    pub pity_pull: u32,
}

impl Default for PullTable {
    fn default() -> Self {
        Self {
            rare_rate: 0.1,
            pity_pull: 6,
        }
    }
}

impl PullTable {
    pub fn from_config(config: &ShrineConfig) -> Self {
        Self {
            rare_rate: config.rare_rate.clamp(0.0, 1.0),
            pity_pull: config.pity_pull,
        }
    }

    /// `roll` is uniform in [0, 1). Below `1 - rare_rate` is Common.
    /// The pity pull is Rare whatever the roll.
    pub fn tier_for_roll(&self, roll: f64, pull_index: u32) -> Tier {
        if pull_index == self.pity_pull {
            return Tier::Rare;
        }
        if roll < 1.0 - self.rare_rate {
            Tier::Common
        } else {
            Tier::Rare
        }
    }

    /// Precondition: `pull_index >= 1`. The counter is the caller's.
    pub fn pull<R: Rng + ?Sized>(&self, rng: &mut R, pull_index: u32) -> PullRecord {
        let roll: f64 = rng.gen();
        PullRecord {
            tier: self.tier_for_roll(roll, pull_index),
            pull_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub id: String,
    pub image: String,
}

impl Reward {
    pub fn new(id: &str, image: &str) -> Self {
        Self {
            id: id.to_string(),
            image: image.to_string(),
        }
    }
}

/// Two disjoint prize pools, one per tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardPools {
    pub common: Vec<Reward>,
    pub rare: Vec<Reward>,
}

impl RewardPools {
    pub fn pool(&self, tier: Tier) -> &[Reward] {
        match tier {
            Tier::Common => &self.common,
            Tier::Rare => &self.rare,
        }
    }

    /// Uniform pick from the tier's pool, independent of the tier roll.
    pub fn pick<R: Rng + ?Sized>(&self, tier: Tier, rng: &mut R) -> Option<&Reward> {
        self.pool(tier).choose(rng)
    }
}

/// A themed pull animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub name: String,
    pub video: String,
    pub tier: Tier,
    pub base_secs: f32,
    pub playback_rate: f32,
}

impl Presentation {
    /// Length at the presentation's playback rate.
    pub fn effective_duration(&self) -> Duration {
        if self.playback_rate <= 0.0 {
            return Duration::from_secs_f32(self.base_secs.max(0.0));
        }
        Duration::from_secs_f32((self.base_secs / self.playback_rate).max(0.0))
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct GachaCatalog {
    pub presentations: Vec<Presentation>,
    pub rewards: RewardPools,
}

impl GachaCatalog {
    pub fn presentations_for(&self, tier: Tier) -> impl Iterator<Item = &Presentation> {
        self.presentations.iter().filter(move |p| p.tier == tier)
    }

    pub fn pick_presentation<R: Rng + ?Sized>(&self, tier: Tier, rng: &mut R) -> Option<&Presentation> {
        let candidates: Vec<&Presentation> = self.presentations_for(tier).collect();
        candidates.choose(rng).copied()
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        for tier in [Tier::Common, Tier::Rare] {
            if self.rewards.pool(tier).is_empty() {
                return Err(ContentError::EmptyRewardPool { tier: tier.label() });
            }
            if self.presentations_for(tier).next().is_none() {
                return Err(ContentError::NoPresentations { tier: tier.label() });
            }
        }
        if let Some(bad) = self
            .presentations
            .iter()
            .find(|p| p.playback_rate.is_nan() || p.playback_rate <= 0.0)
        {
            return Err(ContentError::BadPlaybackRate {
                name: bad.name.clone(),
                rate: bad.playback_rate,
            });
        }
        Ok(())
    }
}
