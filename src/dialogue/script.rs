//! Script data: lines, choices, subtitle tracks.
//!
//! Scripts are built once (from the NPC roster or inline by the gate),
//! validated, and consumed by exactly one session.

use thiserror::Error;

use crate::shared::{BilingualText, NpcId};

/// Input shortcuts exist for the first two choices only ([Space], [Q]).
pub const MAX_CHOICES: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    #[error("subtitle track for {clip} has no cues")]
    EmptyTrack { clip: String },
    #[error("cue {index} of {clip} starts at {at}s, before the track starts")]
    NegativeCueTime { clip: String, index: usize, at: f32 },
    #[error("cue {index} of {clip} at {at}s does not come after the previous cue at {previous}s")]
    CueOutOfOrder {
        clip: String,
        index: usize,
        previous: f32,
        at: f32,
    },
    #[error("line {line} offers {count} choices, at most 2 are supported")]
    TooManyChoices { line: usize, count: usize },
    #[error("choice {choice} on line {line} has an empty label")]
    EmptyChoiceLabel { line: usize, choice: usize },
}

/// A recorded clip, referenced by asset path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceClip(String);

impl VoiceClip {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

/// What a choice (or a finished session) asks the driver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueAction {
    /// Play the NPC's recorded message after the greeting closes.
    ListenToMessage(NpcId),
    MarkVisited(NpcId),
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueChoice {
    pub label: String,
    pub action: DialogueAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialogueLine {
    pub text: BilingualText,
    pub voice: Option<VoiceClip>,
    pub choices: Vec<DialogueChoice>,
}

impl DialogueLine {
    pub fn new(text: BilingualText) -> Self {
        Self {
            text,
            voice: None,
            choices: Vec::new(),
        }
    }

    pub fn with_voice(mut self, clip: VoiceClip) -> Self {
        self.voice = Some(clip);
        self
    }

    pub fn with_choice(mut self, label: impl Into<String>, action: DialogueAction) -> Self {
        self.choices.push(DialogueChoice {
            label: label.into(),
            action,
        });
        self
    }

    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }
}

/// Name and portrait shown in the box for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    pub name: String,
    pub avatar: Option<String>,
}

impl Speaker {
    pub fn new(name: impl Into<String>, avatar: Option<String>) -> Self {
        Self {
            name: name.into(),
            avatar,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub at_seconds: f32,
    pub text: BilingualText,
}

impl SubtitleCue {
    pub fn new(at_seconds: f32, primary: &str, secondary: &str) -> Self {
        Self {
            at_seconds,
            text: BilingualText::new(primary, secondary),
        }
    }
}

/// A voice recording plus its captions, sorted strictly by time.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleTrack {
    clip: VoiceClip,
    cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    pub fn new(clip: VoiceClip, cues: Vec<SubtitleCue>) -> Result<Self, ScriptError> {
        validate_cues(clip.path(), &cues)?;
        Ok(Self { clip, cues })
    }

    pub fn clip(&self) -> &VoiceClip {
        &self.clip
    }

    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    /// Time of the last cue; a validated track always has one.
    pub fn last_cue_at(&self) -> f32 {
        self.cues.last().map_or(0.0, |cue| cue.at_seconds)
    }

    /// Walks forward from `current` while the playback position has
    /// reached the next cue. Never moves backwards.
    pub fn cue_at(&self, position: f32, current: usize) -> usize {
        let mut index = current;
        while index + 1 < self.cues.len() && position >= self.cues[index + 1].at_seconds {
            index += 1;
        }
        index
    }

    pub fn is_bilingual(&self) -> bool {
        self.cues.iter().any(|cue| cue.text.secondary.is_some())
    }
}

pub fn validate_cues(clip: &str, cues: &[SubtitleCue]) -> Result<(), ScriptError> {
    if cues.is_empty() {
        return Err(ScriptError::EmptyTrack {
            clip: clip.to_string(),
        });
    }
    let mut previous: Option<f32> = None;
    for (index, cue) in cues.iter().enumerate() {
        if cue.at_seconds.is_nan() || cue.at_seconds < 0.0 {
            return Err(ScriptError::NegativeCueTime {
                clip: clip.to_string(),
                index,
                at: cue.at_seconds,
            });
        }
        if let Some(previous) = previous {
            if cue.at_seconds <= previous {
                return Err(ScriptError::CueOutOfOrder {
                    clip: clip.to_string(),
                    index,
                    previous,
                    at: cue.at_seconds,
                });
            }
        }
        previous = Some(cue.at_seconds);
    }
    Ok(())
}

/// Line-by-line conversation with typed reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogueScript {
    pub speaker: Speaker,
    pub lines: Vec<DialogueLine>,
    pub on_complete: Option<DialogueAction>,
}

impl DialogueScript {
    pub fn new(speaker: Speaker, lines: Vec<DialogueLine>) -> Self {
        Self {
            speaker,
            lines,
            on_complete: None,
        }
    }

    pub fn on_complete(mut self, action: DialogueAction) -> Self {
        self.on_complete = Some(action);
        self
    }

    /// The secondary channel is enabled for the whole session when any
    /// line carries secondary text.
    pub fn is_bilingual(&self) -> bool {
        self.lines.iter().any(|line| line.text.secondary.is_some())
    }

    pub fn validate(&self) -> Result<(), ScriptError> {
        for (line_index, line) in self.lines.iter().enumerate() {
            if line.choices.len() > MAX_CHOICES {
                return Err(ScriptError::TooManyChoices {
                    line: line_index,
                    count: line.choices.len(),
                });
            }
            if let Some(choice) = line.choices.iter().position(|c| c.label.trim().is_empty()) {
                return Err(ScriptError::EmptyChoiceLabel {
                    line: line_index,
                    choice,
                });
            }
        }
        Ok(())
    }
}

/// One recording played start to finish with captions.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedScript {
    pub speaker: Speaker,
    pub track: SubtitleTrack,
    pub on_complete: Option<DialogueAction>,
}

/// What a `ConversationRequest` carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationScript {
    Lines(DialogueScript),
    Track(SyncedScript),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(at: f32) -> SubtitleCue {
        SubtitleCue::new(at, "line", "ライン")
    }

    #[test]
    fn test_track_accepts_increasing_cues() {
        let track = SubtitleTrack::new(VoiceClip::new("a.ogg"), vec![cue(0.0), cue(2.7), cue(4.2)]);
        assert!(track.is_ok());
    }

    #[test]
    fn test_track_rejects_repeated_time() {
        let err = SubtitleTrack::new(VoiceClip::new("mel.ogg"), vec![cue(0.0), cue(0.0)])
            .expect_err("duplicate times");
        assert!(matches!(err, ScriptError::CueOutOfOrder { index: 1, .. }));
    }

    #[test]
    fn test_track_rejects_negative_and_nan() {
        let err = SubtitleTrack::new(VoiceClip::new("a.ogg"), vec![cue(-1.0)]).expect_err("negative");
        assert!(matches!(err, ScriptError::NegativeCueTime { index: 0, .. }));
        let err = SubtitleTrack::new(VoiceClip::new("a.ogg"), vec![cue(f32::NAN)]).expect_err("nan");
        assert!(matches!(err, ScriptError::NegativeCueTime { .. }));
    }

    #[test]
    fn test_track_rejects_empty() {
        let err = SubtitleTrack::new(VoiceClip::new("a.ogg"), vec![]).expect_err("empty");
        assert!(matches!(err, ScriptError::EmptyTrack { .. }));
    }

    #[test]
    fn test_first_cue_may_start_late() {
        let track = SubtitleTrack::new(VoiceClip::new("a.ogg"), vec![cue(1.5), cue(3.0)])
            .expect("valid");
        // The first cue is active from the start of the track.
        assert_eq!(track.cue_at(0.0, 0), 0);
        assert_eq!(track.cue_at(3.0, 0), 1);
    }

    #[test]
    fn test_cue_at_catches_up_and_never_rewinds() {
        let track = SubtitleTrack::new(
            VoiceClip::new("a.ogg"),
            vec![cue(0.0), cue(1.0), cue(2.0), cue(3.0)],
        )
        .expect("valid");
        assert_eq!(track.cue_at(2.5, 0), 2);
        assert_eq!(track.cue_at(0.5, 2), 2);
        assert_eq!(track.cue_at(99.0, 2), 3);
    }

    #[test]
    fn test_script_rejects_three_choices() {
        let line = DialogueLine::new(BilingualText::primary_only("?"))
            .with_choice("a", DialogueAction::Leave)
            .with_choice("b", DialogueAction::Leave)
            .with_choice("c", DialogueAction::Leave);
        let script = DialogueScript::new(Speaker::new("Risu", None), vec![line]);
        assert_eq!(
            script.validate(),
            Err(ScriptError::TooManyChoices { line: 0, count: 3 })
        );
    }

    #[test]
    fn test_script_bilingual_flag() {
        let mono = DialogueScript::new(
            Speaker::new("Risu", None),
            vec![DialogueLine::new(BilingualText::primary_only("hi"))],
        );
        assert!(!mono.is_bilingual());
        let bi = DialogueScript::new(
            Speaker::new("Risu", None),
            vec![DialogueLine::new(BilingualText::new("hi", "やあ"))],
        );
        assert!(bi.is_bilingual());
    }
}
