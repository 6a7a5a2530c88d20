//! Shared components, resources, events, and states for the shrine.
//!
//! This is the type contract. Every domain plugin imports from here.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

/// `Overworld` is the only state in which the player moves and interacts;
/// every other state is a modal surface that owns input until it exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Overworld,
    Dialogue,
    Archery,
    Gacha,
    Ending,
}

// ═══════════════════════════════════════════════════════════════════════
// TEXT
// ═══════════════════════════════════════════════════════════════════════

/// Parallel-language text: English on the primary channel, Japanese on the
/// optional secondary channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BilingualText {
    pub primary: String,
    pub secondary: Option<String>,
}

impl BilingualText {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: Some(secondary.into()),
        }
    }

    pub fn primary_only(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
        }
    }

    pub fn secondary_str(&self) -> &str {
        self.secondary.as_deref().unwrap_or("")
    }

    /// Number of reveal ticks needed to show both channels in full,
    /// counted in characters rather than bytes.
    pub fn reveal_len(&self) -> usize {
        let primary = self.primary.chars().count();
        let secondary = self.secondary_str().chars().count();
        primary.max(secondary)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// NPCS & INTERACTABLES
// ═══════════════════════════════════════════════════════════════════════

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum NpcId {
    Bumblebee,
    Rintsuki,
    Macs,
    Levenski,
    Howl,
    Anipha,
    Thighs,
    Santru,
    Chris,
    Scarfy,
    Mel,
}

impl NpcId {
    pub const ALL: [NpcId; 11] = [
        NpcId::Bumblebee,
        NpcId::Rintsuki,
        NpcId::Macs,
        NpcId::Levenski,
        NpcId::Howl,
        NpcId::Anipha,
        NpcId::Thighs,
        NpcId::Santru,
        NpcId::Chris,
        NpcId::Scarfy,
        NpcId::Mel,
    ];
}

/// Everything the player can walk up to and press [E] on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interactable {
    Npc(NpcId),
    ArcheryRange,
    GachaShrine,
    Portal,
}

impl Interactable {
    /// Minigame entrances use the wider capture radius.
    pub fn is_minigame_entrance(&self) -> bool {
        matches!(self, Interactable::ArcheryRange | Interactable::GachaShrine)
    }

    pub fn label(&self) -> String {
        match self {
            Interactable::Npc(npc) => format!("{:?}", npc),
            Interactable::ArcheryRange => "Archery Range".to_string(),
            Interactable::GachaShrine => "Gacha Shrine".to_string(),
            Interactable::Portal => "Portal".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

/// Position in map coordinates (1920×1080, origin top-left, y down).
/// `Transform` is derived from this every frame.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MapPosition(pub Vec2);

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// Game actions for the current frame. Rebuilt from hardware input every
/// frame in `PreUpdate`; domains never read `ButtonInput` directly.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    /// [E] near an interactable.
    pub interact: bool,
    /// [Space]: continue, first choice, pull / skip.
    pub advance: bool,
    /// [Q]: second choice, leave a minigame.
    pub secondary: bool,
    /// [Esc]: skip the active conversation.
    pub cancel: bool,
    /// [1]..[9]: direct choice selection.
    pub select_choice: Option<usize>,
    /// Left click this frame, in map coordinates.
    pub pointer: Option<Vec2>,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Overworld,
    Dialogue,
    Minigame,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Which progression requirement just flipped to done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    NpcVisited(NpcId),
    ArcheryPassed,
    TopTierPulled,
}

#[derive(Event, Debug, Clone)]
pub struct QuestProgressEvent {
    pub milestone: Milestone,
}

#[derive(Event, Debug, Clone)]
pub struct PlaySfxEvent {
    pub sfx_id: String,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const MAP_WIDTH: f32 = 1920.0;
pub const MAP_HEIGHT: f32 = 1080.0;

pub const Z_BACKGROUND: f32 = 0.0;
pub const Z_PLAYER: f32 = 10.0;

/// Map coordinates (top-left origin) to world coordinates (centred, y up).
pub fn map_to_world(pos: Vec2) -> Vec2 {
    Vec2::new(pos.x - MAP_WIDTH / 2.0, MAP_HEIGHT / 2.0 - pos.y)
}

/// Scales a window cursor position onto the map.
pub fn window_to_map(cursor: Vec2, window_size: Vec2) -> Vec2 {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return cursor;
    }
    Vec2::new(
        cursor.x * MAP_WIDTH / window_size.x,
        cursor.y * MAP_HEIGHT / window_size.y,
    )
}
