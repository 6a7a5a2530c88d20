//! Quest ledger: which progression requirements are satisfied.
//!
//! The ledger is an ordinary resource, created fresh when the game data
//! loads. Only three things write to it: the dialogue driver (a required
//! NPC's message was heard), the archery round (passed), and the gacha
//! screen (top tier drawn). The interaction gate reads it to decide
//! whether the portal opens.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::shared::*;

pub struct QuestPlugin;

impl Plugin for QuestPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<QuestLedger>()
            .add_event::<QuestProgressEvent>()
            .add_systems(Update, log_quest_progress);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct QuestLedger {
    npcs_visited: BTreeMap<NpcId, bool>,
    archery_passed: bool,
    top_tier_pulled: bool,
}

impl Default for QuestLedger {
    fn default() -> Self {
        Self::with_required([
            NpcId::Rintsuki,
            NpcId::Levenski,
            NpcId::Howl,
            NpcId::Santru,
        ])
    }
}

impl QuestLedger {
    pub fn with_required(npcs: impl IntoIterator<Item = NpcId>) -> Self {
        Self {
            npcs_visited: npcs.into_iter().map(|npc| (npc, false)).collect(),
            archery_passed: false,
            top_tier_pulled: false,
        }
    }

    pub fn is_tracked(&self, npc: NpcId) -> bool {
        self.npcs_visited.contains_key(&npc)
    }

    /// Returns true only when a tracked NPC flips from unvisited to visited.
    /// NPCs outside the required set are ignored.
    pub fn mark_visited(&mut self, npc: NpcId) -> bool {
        match self.npcs_visited.get_mut(&npc) {
            Some(visited) if !*visited => {
                *visited = true;
                true
            }
            Some(_) => false,
            None => {
                debug!("[Quests] {:?} is not a required NPC; nothing to record", npc);
                false
            }
        }
    }

    /// Minigame A: the aim trainer.
    pub fn mark_archery_passed(&mut self) -> bool {
        !std::mem::replace(&mut self.archery_passed, true)
    }

    /// Minigame B: a top-tier gacha reward.
    pub fn mark_top_tier_pulled(&mut self) -> bool {
        !std::mem::replace(&mut self.top_tier_pulled, true)
    }

    pub fn archery_passed(&self) -> bool {
        self.archery_passed
    }

    pub fn top_tier_pulled(&self) -> bool {
        self.top_tier_pulled
    }

    pub fn has_visited(&self, npc: NpcId) -> bool {
        self.npcs_visited.get(&npc).copied().unwrap_or(false)
    }

    pub fn all_npcs_visited(&self) -> bool {
        self.npcs_visited.values().all(|visited| *visited)
    }

    pub fn visited_count(&self) -> usize {
        self.npcs_visited.values().filter(|visited| **visited).count()
    }

    pub fn tracked_count(&self) -> usize {
        self.npcs_visited.len()
    }

    pub fn required_npcs(&self) -> impl Iterator<Item = NpcId> + '_ {
        self.npcs_visited.keys().copied()
    }

    pub fn is_complete(&self) -> bool {
        self.all_npcs_visited() && self.archery_passed && self.top_tier_pulled
    }

    /// First unmet requirement, rarest first: gacha, then archery, then NPCs.
    pub fn missing_requirement(&self) -> Option<BilingualText> {
        if !self.top_tier_pulled {
            return Some(BilingualText::new(
                "You still need get a 5 star from the Gacha Shrine.",
                "5starのプライズを 貰わなきゃいけないよ",
            ));
        }
        if !self.archery_passed {
            return Some(BilingualText::new(
                "You still need to complete the Archery Challenge.",
                "まだアーチェリーのチャレンジ を完成してないよ！",
            ));
        }
        if !self.all_npcs_visited() {
            return Some(BilingualText::new(
                "You still need to talk to all NPCs.",
                "全てのNPCと話しなきゃいけない！",
            ));
        }
        None
    }
}

fn log_quest_progress(mut events: EventReader<QuestProgressEvent>, ledger: Res<QuestLedger>) {
    for event in events.read() {
        info!(
            "[Quests] {:?} done ({}/{} messages, archery: {}, 5★: {}, complete: {})",
            event.milestone,
            ledger.visited_count(),
            ledger.tracked_count(),
            ledger.archery_passed(),
            ledger.top_tier_pulled(),
            ledger.is_complete(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_minigames() -> QuestLedger {
        let mut ledger = QuestLedger::default();
        ledger.mark_archery_passed();
        ledger.mark_top_tier_pulled();
        ledger
    }

    #[test]
    fn test_new_ledger_is_incomplete() {
        let ledger = QuestLedger::default();
        assert!(!ledger.is_complete());
        assert_eq!(ledger.tracked_count(), 4);
        assert_eq!(ledger.visited_count(), 0);
    }

    #[test]
    fn test_single_unvisited_npc_blocks_completion() {
        // Regression: every flag must be checked, not just counted as present.
        let mut ledger = finished_minigames();
        ledger.mark_visited(NpcId::Rintsuki);
        ledger.mark_visited(NpcId::Levenski);
        ledger.mark_visited(NpcId::Howl);
        assert!(!ledger.all_npcs_visited());
        assert!(!ledger.is_complete());

        ledger.mark_visited(NpcId::Santru);
        assert!(ledger.is_complete());
    }

    #[test]
    fn test_missing_minigame_blocks_completion() {
        let mut ledger = QuestLedger::default();
        for npc in [NpcId::Rintsuki, NpcId::Levenski, NpcId::Howl, NpcId::Santru] {
            ledger.mark_visited(npc);
        }
        ledger.mark_archery_passed();
        assert!(!ledger.is_complete());
        ledger.mark_top_tier_pulled();
        assert!(ledger.is_complete());
    }

    #[test]
    fn test_three_of_four_reports_npc_message() {
        let mut ledger = finished_minigames();
        ledger.mark_visited(NpcId::Rintsuki);
        ledger.mark_visited(NpcId::Howl);
        ledger.mark_visited(NpcId::Santru);
        let missing = ledger.missing_requirement().expect("one NPC left");
        assert_eq!(missing.primary, "You still need to talk to all NPCs.");
    }

    #[test]
    fn test_missing_requirement_priority_order() {
        let mut ledger = QuestLedger::default();
        let first = ledger.missing_requirement().expect("nothing done");
        assert!(first.primary.contains("Gacha Shrine"));

        ledger.mark_top_tier_pulled();
        let second = ledger.missing_requirement().expect("archery left");
        assert!(second.primary.contains("Archery"));

        ledger.mark_archery_passed();
        let third = ledger.missing_requirement().expect("npcs left");
        assert!(third.primary.contains("NPCs"));
    }

    #[test]
    fn test_complete_ledger_has_no_missing_requirement() {
        let mut ledger = finished_minigames();
        for npc in NpcId::ALL {
            ledger.mark_visited(npc);
        }
        assert!(ledger.is_complete());
        assert_eq!(ledger.missing_requirement(), None);
    }

    #[test]
    fn test_marks_are_idempotent() {
        let mut ledger = QuestLedger::default();
        assert!(ledger.mark_visited(NpcId::Howl));
        assert!(!ledger.mark_visited(NpcId::Howl));
        assert!(ledger.mark_archery_passed());
        assert!(!ledger.mark_archery_passed());
        assert!(ledger.mark_top_tier_pulled());
        assert!(!ledger.mark_top_tier_pulled());
        assert_eq!(ledger.visited_count(), 1);
    }

    #[test]
    fn test_untracked_npc_is_ignored() {
        let mut ledger = QuestLedger::default();
        assert!(!ledger.mark_visited(NpcId::Mel));
        assert!(!ledger.is_tracked(NpcId::Mel));
        assert_eq!(ledger.visited_count(), 0);
    }

    #[test]
    fn test_empty_required_set_only_needs_minigames() {
        let mut ledger = QuestLedger::with_required([]);
        assert!(ledger.all_npcs_visited());
        ledger.mark_archery_passed();
        ledger.mark_top_tier_pulled();
        assert!(ledger.is_complete());
    }
}
