//! Tuning knobs for the whole game, loaded from `assets/config/shrine.ron`
//! when present. Every field has a default, so a partial file only
//! overrides what it names.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use crate::shared::NpcId;

pub const CONFIG_PATH: &str = "assets/config/shrine.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShrineConfig {
    // Dialogue
    pub typing_interval_ms: u64,
    pub subtitle_poll_ms: u64,
    /// Pause between the greeting closing and the voice message starting.
    pub message_delay_ms: u64,
    /// How long a subtitle track keeps going past its last cue when its
    /// recording is unavailable.
    pub silent_track_tail_secs: f32,

    // Overworld
    pub npc_radius: f32,
    pub minigame_radius: f32,
    pub player_speed: f32,
    pub required_npcs: Vec<NpcId>,

    // Gacha
    pub rare_rate: f64,
    pub pity_pull: u32,
    pub prize_dwell_secs: f32,

    // Archery
    pub archery_round_secs: f32,
    pub archery_pass_score: u32,
    pub archery_result_secs: f32,
}

impl Default for ShrineConfig {
    fn default() -> Self {
        Self {
            typing_interval_ms: 30,
            subtitle_poll_ms: 200,
            message_delay_ms: 1000,
            silent_track_tail_secs: 4.0,
            npc_radius: 40.0,
            minigame_radius: 60.0,
            player_speed: 400.0,
            required_npcs: vec![
                NpcId::Rintsuki,
                NpcId::Levenski,
                NpcId::Howl,
                NpcId::Santru,
            ],
            rare_rate: 0.1,
            pity_pull: 6,
            prize_dwell_secs: 7.0,
            archery_round_secs: 20.0,
            archery_pass_score: 50,
            archery_result_secs: 2.0,
        }
    }
}

impl ShrineConfig {
    pub fn from_ron(text: &str, path: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_ron(&text, &display)
    }

    /// Missing file means defaults; a broken file is reported and also
    /// falls back to defaults so the game still starts.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config: {} not found, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("Config: loaded {}", path.display());
                config
            }
            Err(err) => {
                error!("Config: {err}; using defaults");
                Self::default()
            }
        }
    }

    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms.max(1))
    }

    pub fn subtitle_poll(&self) -> Duration {
        Duration::from_millis(self.subtitle_poll_ms.max(1))
    }

    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }
}
