//! NPC profiles and the scripts built from them.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::script::*;
use crate::data::ContentError;
use crate::shared::{BilingualText, NpcId};

/// A friend's birthday message.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedMessage {
    /// A recording with captions.
    Voice(SubtitleTrack),
    /// No recording: the captions are typed out line by line instead.
    Text(Vec<BilingualText>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NpcProfile {
    pub id: NpcId,
    pub name: String,
    pub avatar: Option<String>,
    /// Anchor on the 1920×1080 map.
    pub anchor: Vec2,
    pub greeting: BilingualText,
    pub message: RecordedMessage,
}

impl NpcProfile {
    pub fn speaker(&self) -> Speaker {
        Speaker::new(self.name.clone(), self.avatar.clone())
    }

    /// Greeting with [Listen] / [Leave]. Leaving does not count as a visit.
    pub fn greeting_script(&self) -> DialogueScript {
        let line = DialogueLine::new(self.greeting.clone())
            .with_choice(
                "Listen to Voice Message",
                DialogueAction::ListenToMessage(self.id),
            )
            .with_choice("Leave", DialogueAction::Leave);
        DialogueScript::new(self.speaker(), vec![line])
    }

    /// The message itself; finishing it (or skipping it) marks the visit.
    pub fn message_script(&self) -> ConversationScript {
        let visited = Some(DialogueAction::MarkVisited(self.id));
        match &self.message {
            RecordedMessage::Voice(track) => ConversationScript::Track(SyncedScript {
                speaker: self.speaker(),
                track: track.clone(),
                on_complete: visited,
            }),
            RecordedMessage::Text(lines) => ConversationScript::Lines(DialogueScript {
                speaker: self.speaker(),
                lines: lines.iter().cloned().map(DialogueLine::new).collect(),
                on_complete: visited,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        self.greeting_script()
            .validate()
            .map_err(|source| ContentError::Script {
                npc: self.id,
                source,
            })?;
        match &self.message {
            RecordedMessage::Voice(track) => {
                validate_cues(track.clip().path(), track.cues()).map_err(|source| {
                    ContentError::Script {
                        npc: self.id,
                        source,
                    }
                })
            }
            RecordedMessage::Text(lines) if lines.is_empty() => {
                Err(ContentError::EmptyMessage { npc: self.id })
            }
            RecordedMessage::Text(_) => Ok(()),
        }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct NpcRegistry {
    pub npcs: BTreeMap<NpcId, NpcProfile>,
}

impl NpcRegistry {
    pub fn insert(&mut self, profile: NpcProfile) {
        self.npcs.insert(profile.id, profile);
    }

    pub fn get(&self, npc: NpcId) -> Option<&NpcProfile> {
        self.npcs.get(&npc)
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    /// Every profile is well formed and every required NPC exists.
    pub fn validate(&self, required: &[NpcId]) -> Result<(), ContentError> {
        for profile in self.npcs.values() {
            profile.validate()?;
        }
        if let Some(missing) = required.iter().find(|npc| !self.npcs.contains_key(npc)) {
            return Err(ContentError::UnknownNpc(*missing));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: NpcId, message: RecordedMessage) -> NpcProfile {
        NpcProfile {
            id,
            name: format!("{:?}", id),
            avatar: None,
            anchor: Vec2::ZERO,
            greeting: BilingualText::new("Hey, Void! Long time no see.", "やあ、ヴォイド！久しぶりだね。"),
            message,
        }
    }

    fn voice(id: NpcId) -> NpcProfile {
        let track = SubtitleTrack::new(
            VoiceClip::new("voices/test.ogg"),
            vec![SubtitleCue::new(0.0, "hi", "やあ")],
        )
        .expect("valid track");
        profile(id, RecordedMessage::Voice(track))
    }

    #[test]
    fn test_greeting_offers_listen_then_leave() {
        let script = voice(NpcId::Howl).greeting_script();
        let choices = &script.lines[0].choices;
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].action, DialogueAction::ListenToMessage(NpcId::Howl));
        assert_eq!(choices[1].action, DialogueAction::Leave);
        assert_eq!(script.on_complete, None);
    }

    #[test]
    fn test_message_marks_visit_on_completion() {
        match voice(NpcId::Santru).message_script() {
            ConversationScript::Track(script) => {
                assert_eq!(script.on_complete, Some(DialogueAction::MarkVisited(NpcId::Santru)));
            }
            other => panic!("expected a synced script, got {other:?}"),
        }
        let text = profile(
            NpcId::Scarfy,
            RecordedMessage::Text(vec![BilingualText::new("We all love you.", "大好きだよ。")]),
        );
        match text.message_script() {
            ConversationScript::Lines(script) => {
                assert_eq!(script.lines.len(), 1);
                assert_eq!(script.on_complete, Some(DialogueAction::MarkVisited(NpcId::Scarfy)));
            }
            other => panic!("expected a line script, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_reports_missing_required_npc() {
        let mut registry = NpcRegistry::default();
        registry.insert(voice(NpcId::Rintsuki));
        assert_eq!(
            registry.validate(&[NpcId::Rintsuki, NpcId::Levenski]),
            Err(ContentError::UnknownNpc(NpcId::Levenski))
        );
        assert!(registry.validate(&[NpcId::Rintsuki]).is_ok());
    }

    #[test]
    fn test_empty_text_message_is_rejected() {
        let mut registry = NpcRegistry::default();
        registry.insert(profile(NpcId::Mel, RecordedMessage::Text(vec![])));
        assert_eq!(
            registry.validate(&[]),
            Err(ContentError::EmptyMessage { npc: NpcId::Mel })
        );
    }
}
