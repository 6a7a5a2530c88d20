//! Dialogue sequencer: one conversation from its first line to close.
//!
//! A session is a plain state machine. It never touches the ECS; the
//! driver hands it the elapsed frame time plus the two boundaries it
//! talks to (the conversation surface and the voice player), then drains
//! the signals it produced.
//!
//! Per line: `Revealing → AwaitingAdvance → (next line | Closed)`. The
//! idle step between lines is instantaneous: advancing enters the next
//! line's reveal in the same call. A subtitled recording runs in its own
//! `PlayingTrack` state instead of per-line reveal.
//!
//! Every timer lives inside the state that needs it, so leaving a state
//! (or closing) drops its timers and no stray tick can fire afterwards.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::Stopwatch;
use thiserror::Error;

use super::script::*;
use crate::config::ShrineConfig;

// ═══════════════════════════════════════════════════════════════════════
// BOUNDARIES
// ═══════════════════════════════════════════════════════════════════════

/// Dialogue box, avatar, text fields and choice buttons.
pub trait ConversationSurface {
    fn show_conversation(&mut self, speaker: &Speaker, bilingual: bool);
    fn hide_conversation(&mut self);
    fn set_primary_text(&mut self, text: &str);
    fn set_secondary_text(&mut self, text: &str);
    fn render_choices(&mut self, labels: &[String]);
    fn clear_choices(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackStatus {
    Playing { position_secs: f32 },
    Finished,
    /// The clip could not be loaded. Callers fall back to text only.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("voice clip has an empty path")]
    EmptyPath,
    #[error("voice clip {0} could not be loaded")]
    Unavailable(String),
}

/// Completion is polled through `status` once per frame.
pub trait VoicePlayer {
    fn play(&mut self, clip: &VoiceClip) -> Result<PlaybackId, AudioError>;
    fn stop(&mut self, playback: PlaybackId);
    fn status(&self, playback: PlaybackId) -> PlaybackStatus;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueError {
    #[error("a conversation is already open on this surface")]
    SurfaceBusy,
    #[error("the current line has no choice {0}")]
    NoSuchChoice(usize),
    #[error("the conversation is not waiting for a choice")]
    NotAwaitingChoice,
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTiming {
    pub typing_interval: Duration,
    pub poll_interval: Duration,
    pub silent_tail: Duration,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self {
            typing_interval: Duration::from_millis(30),
            poll_interval: Duration::from_millis(200),
            silent_tail: Duration::from_secs(4),
        }
    }
}

impl SequencerTiming {
    pub fn from_config(config: &ShrineConfig) -> Self {
        Self {
            typing_interval: config.typing_interval(),
            poll_interval: config.subtitle_poll(),
            silent_tail: Duration::from_secs_f32(config.silent_track_tail_secs.max(0.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    ChoiceSelected(DialogueAction),
    /// Emitted exactly once per session, however it closed.
    Completed(Option<DialogueAction>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Revealing,
    AwaitingAdvance,
    AwaitingChoice,
    PlayingTrack,
    Closed,
}

#[derive(Debug)]
enum Content {
    Lines(Vec<DialogueLine>),
    Track(SubtitleTrack),
}

#[derive(Debug)]
enum SessionState {
    Revealing {
        line: usize,
        shown: usize,
        target: usize,
        tick: Timer,
    },
    AwaitingAdvance {
        line: usize,
    },
    PlayingTrack {
        cue: usize,
        poll: Timer,
        clock: Stopwatch,
        silent: bool,
    },
    Closed,
}

#[derive(Debug)]
pub struct DialogueSession {
    speaker: Speaker,
    bilingual: bool,
    content: Content,
    timing: SequencerTiming,
    state: SessionState,
    /// The one voice clip this session may have playing.
    voice: Option<PlaybackId>,
    on_complete: Option<DialogueAction>,
    signals: Vec<SessionSignal>,
}

impl DialogueSession {
    /// Opens the surface and starts revealing line 0. An empty script
    /// completes at once without showing anything.
    pub fn start(
        script: DialogueScript,
        timing: SequencerTiming,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) -> Self {
        let bilingual = script.is_bilingual();
        let mut session = Self {
            speaker: script.speaker,
            bilingual,
            content: Content::Lines(script.lines),
            timing,
            state: SessionState::Closed,
            voice: None,
            on_complete: script.on_complete,
            signals: Vec::new(),
        };

        if session.line_count() == 0 {
            info!(
                "[Dialogue] empty script for {}, completing without a box",
                session.speaker.name
            );
            let action = session.on_complete.take();
            session.signals.push(SessionSignal::Completed(action));
            return session;
        }

        info!(
            "[Dialogue] session with {} started ({} lines)",
            session.speaker.name,
            session.line_count()
        );
        surface.show_conversation(&session.speaker, bilingual);
        session.enter_line(0, surface, audio);
        session
    }

    /// Plays one recording and walks its captions by playback position.
    pub fn start_synced(
        script: SyncedScript,
        timing: SequencerTiming,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) -> Self {
        let bilingual = script.track.is_bilingual();
        surface.show_conversation(&script.speaker, bilingual);

        let voice = match audio.play(script.track.clip()) {
            Ok(id) => Some(id),
            Err(err) => {
                warn!("[Dialogue] {err}; captions will follow the session clock");
                None
            }
        };

        info!(
            "[Dialogue] recorded message from {} started ({} captions)",
            script.speaker.name,
            script.track.cues().len()
        );

        let session = Self {
            speaker: script.speaker,
            bilingual,
            content: Content::Track(script.track),
            timing,
            state: SessionState::PlayingTrack {
                cue: 0,
                poll: Timer::new(timing.poll_interval, TimerMode::Repeating),
                clock: Stopwatch::new(),
                silent: voice.is_none(),
            },
            voice,
            on_complete: script.on_complete,
            signals: Vec::new(),
        };
        session.show_cue(0, surface);
        session
    }

    // ─── Inputs ──────────────────────────────────────────────────────────

    pub fn tick(
        &mut self,
        dt: Duration,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) {
        match &mut self.state {
            SessionState::Revealing {
                line,
                shown,
                target,
                tick,
            } => {
                tick.tick(dt);
                let steps = tick.times_finished_this_tick() as usize;
                if steps == 0 {
                    return;
                }
                *shown = (*shown + steps).min(*target);
                let (line, shown, target) = (*line, *shown, *target);
                self.render_reveal(line, shown, surface);
                if shown >= target {
                    self.await_input(line, surface);
                }
            }
            SessionState::PlayingTrack { .. } => self.tick_track(dt, surface, audio),
            SessionState::AwaitingAdvance { .. } | SessionState::Closed => {}
        }
    }

    /// "Continue". On a line with choices this is the shortcut for the
    /// first choice. Ignored while text is revealing or a track plays.
    /// Returns whether the input was used.
    pub fn advance(
        &mut self,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) -> bool {
        let SessionState::AwaitingAdvance { line } = &self.state else {
            return false;
        };
        let line = *line;
        if self.line_has_choices(line) {
            return self.select_choice(0, surface, audio).is_ok();
        }
        self.next_line(line, surface, audio);
        true
    }

    /// Shortcut for the second choice. Does nothing on lines without one.
    pub fn secondary(
        &mut self,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) -> bool {
        self.select_choice(1, surface, audio).is_ok()
    }

    pub fn select_choice(
        &mut self,
        index: usize,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) -> Result<DialogueAction, DialogueError> {
        let SessionState::AwaitingAdvance { line } = &self.state else {
            return Err(DialogueError::NotAwaitingChoice);
        };
        let line = *line;
        let Content::Lines(lines) = &self.content else {
            return Err(DialogueError::NotAwaitingChoice);
        };
        let choices = &lines[line].choices;
        if choices.is_empty() {
            return Err(DialogueError::NotAwaitingChoice);
        }
        let action = choices
            .get(index)
            .ok_or(DialogueError::NoSuchChoice(index))?
            .action;

        surface.clear_choices();
        self.signals.push(SessionSignal::ChoiceSelected(action));
        self.next_line(line, surface, audio);
        Ok(action)
    }

    /// Backs out (or skips to the end): same teardown and completion as a
    /// natural finish. Safe to call on a closed session.
    pub fn skip(&mut self, surface: &mut dyn ConversationSurface, audio: &mut dyn VoicePlayer) {
        self.close(surface, audio);
    }

    // ─── Observers ───────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            SessionState::Revealing { .. } => SessionPhase::Revealing,
            SessionState::AwaitingAdvance { line } if self.line_has_choices(*line) => {
                SessionPhase::AwaitingChoice
            }
            SessionState::AwaitingAdvance { .. } => SessionPhase::AwaitingAdvance,
            SessionState::PlayingTrack { .. } => SessionPhase::PlayingTrack,
            SessionState::Closed => SessionPhase::Closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    /// Index of the line being shown, for line-by-line sessions.
    pub fn cursor(&self) -> Option<usize> {
        match &self.state {
            SessionState::Revealing { line, .. } | SessionState::AwaitingAdvance { line } => {
                Some(*line)
            }
            _ => None,
        }
    }

    /// Characters shown on the current line.
    pub fn reveal_progress(&self) -> Option<usize> {
        match &self.state {
            SessionState::Revealing { shown, .. } => Some(*shown),
            SessionState::AwaitingAdvance { line } => self.line(*line).map(|l| l.text.reveal_len()),
            _ => None,
        }
    }

    pub fn active_cue(&self) -> Option<usize> {
        match &self.state {
            SessionState::PlayingTrack { cue, .. } => Some(*cue),
            _ => None,
        }
    }

    pub fn active_voice(&self) -> Option<PlaybackId> {
        self.voice
    }

    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    pub fn take_signals(&mut self) -> Vec<SessionSignal> {
        std::mem::take(&mut self.signals)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn line_count(&self) -> usize {
        match &self.content {
            Content::Lines(lines) => lines.len(),
            Content::Track(_) => 0,
        }
    }

    fn line(&self, index: usize) -> Option<&DialogueLine> {
        match &self.content {
            Content::Lines(lines) => lines.get(index),
            Content::Track(_) => None,
        }
    }

    fn line_has_choices(&self, index: usize) -> bool {
        self.line(index).is_some_and(DialogueLine::has_choices)
    }

    fn enter_line(
        &mut self,
        index: usize,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) {
        let Some(line) = self.line(index) else {
            self.close(surface, audio);
            return;
        };
        let clip = line.voice.clone();
        let target = line.text.reveal_len();

        surface.clear_choices();
        surface.set_primary_text("");
        if self.bilingual {
            surface.set_secondary_text("");
        }

        // Voice starts before the first reveal tick.
        if let Some(clip) = clip {
            self.play_voice(&clip, audio);
        }

        if target == 0 {
            self.await_input(index, surface);
        } else {
            self.state = SessionState::Revealing {
                line: index,
                shown: 0,
                target,
                tick: Timer::new(self.timing.typing_interval, TimerMode::Repeating),
            };
        }
    }

    fn render_reveal(&self, index: usize, shown: usize, surface: &mut dyn ConversationSurface) {
        let Some(line) = self.line(index) else { return };
        surface.set_primary_text(char_prefix(&line.text.primary, shown));
        if self.bilingual {
            surface.set_secondary_text(char_prefix(line.text.secondary_str(), shown));
        }
    }

    fn await_input(&mut self, index: usize, surface: &mut dyn ConversationSurface) {
        if let Some(line) = self.line(index) {
            if line.has_choices() {
                let labels: Vec<String> = line.choices.iter().map(|c| c.label.clone()).collect();
                surface.render_choices(&labels);
            }
        }
        self.state = SessionState::AwaitingAdvance { line: index };
    }

    fn next_line(
        &mut self,
        current: usize,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) {
        if current + 1 < self.line_count() {
            self.enter_line(current + 1, surface, audio);
        } else {
            self.close(surface, audio);
        }
    }

    fn show_cue(&self, index: usize, surface: &mut dyn ConversationSurface) {
        let Content::Track(track) = &self.content else { return };
        let Some(cue) = track.cues().get(index) else { return };
        surface.set_primary_text(&cue.text.primary);
        if self.bilingual {
            surface.set_secondary_text(cue.text.secondary_str());
        }
    }

    fn tick_track(
        &mut self,
        dt: Duration,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) {
        let Content::Track(track) = &self.content else { return };
        let SessionState::PlayingTrack {
            cue,
            poll,
            clock,
            silent,
        } = &mut self.state
        else {
            return;
        };
        clock.tick(dt);
        poll.tick(dt);

        let status = match self.voice {
            Some(id) => audio.status(id),
            None => PlaybackStatus::Unavailable,
        };
        let (position, finished) = match status {
            PlaybackStatus::Playing { position_secs } => (position_secs, false),
            PlaybackStatus::Finished => (track.last_cue_at(), true),
            PlaybackStatus::Unavailable => {
                if !*silent {
                    warn!(
                        "[Dialogue] recording for {} is unavailable; captions follow the session clock",
                        self.speaker.name
                    );
                    *silent = true;
                }
                let elapsed = clock.elapsed_secs();
                let end = track.last_cue_at() + self.timing.silent_tail.as_secs_f32();
                (elapsed, elapsed >= end)
            }
        };

        let mut changed = None;
        if poll.times_finished_this_tick() > 0 {
            let next = track.cue_at(position, *cue);
            if next != *cue {
                *cue = next;
                changed = Some(next);
            }
        }

        if let Some(index) = changed {
            self.show_cue(index, surface);
        }
        if finished {
            self.close(surface, audio);
        }
    }

    fn play_voice(&mut self, clip: &VoiceClip, audio: &mut dyn VoicePlayer) {
        self.stop_voice(audio);
        match audio.play(clip) {
            Ok(id) => self.voice = Some(id),
            Err(err) => warn!("[Dialogue] {err}; continuing with text only"),
        }
    }

    fn stop_voice(&mut self, audio: &mut dyn VoicePlayer) {
        if let Some(id) = self.voice.take() {
            audio.stop(id);
        }
    }

    fn close(&mut self, surface: &mut dyn ConversationSurface, audio: &mut dyn VoicePlayer) {
        if self.is_closed() {
            return;
        }
        self.stop_voice(audio);
        surface.clear_choices();
        surface.hide_conversation();
        self.state = SessionState::Closed;
        info!("[Dialogue] session with {} closed", self.speaker.name);
        let action = self.on_complete.take();
        self.signals.push(SessionSignal::Completed(action));
    }
}

/// First `chars` characters of `text`, sliced on a char boundary.
fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::{BilingualText, NpcId};
    use std::collections::{BTreeSet, HashMap};

    #[derive(Default)]
    struct FakeSurface {
        visible: bool,
        shows: usize,
        primary: String,
        secondary: String,
        choices: Vec<String>,
    }

    impl ConversationSurface for FakeSurface {
        fn show_conversation(&mut self, _speaker: &Speaker, _bilingual: bool) {
            self.visible = true;
            self.shows += 1;
        }
        fn hide_conversation(&mut self) {
            self.visible = false;
        }
        fn set_primary_text(&mut self, text: &str) {
            self.primary = text.to_string();
        }
        fn set_secondary_text(&mut self, text: &str) {
            self.secondary = text.to_string();
        }
        fn render_choices(&mut self, labels: &[String]) {
            self.choices = labels.to_vec();
        }
        fn clear_choices(&mut self) {
            self.choices.clear();
        }
    }

    #[derive(Default)]
    struct FakeVoice {
        next: u64,
        fail: bool,
        live: BTreeSet<PlaybackId>,
        max_live: usize,
        started: Vec<String>,
        status: HashMap<PlaybackId, PlaybackStatus>,
    }

    impl FakeVoice {
        fn set(&mut self, id: PlaybackId, status: PlaybackStatus) {
            self.status.insert(id, status);
        }
    }

    impl VoicePlayer for FakeVoice {
        fn play(&mut self, clip: &VoiceClip) -> Result<PlaybackId, AudioError> {
            if self.fail {
                return Err(AudioError::Unavailable(clip.path().to_string()));
            }
            self.next += 1;
            let id = PlaybackId(self.next);
            self.live.insert(id);
            self.max_live = self.max_live.max(self.live.len());
            self.started.push(clip.path().to_string());
            self.status.insert(id, PlaybackStatus::Playing { position_secs: 0.0 });
            Ok(id)
        }
        fn stop(&mut self, playback: PlaybackId) {
            self.live.remove(&playback);
        }
        fn status(&self, playback: PlaybackId) -> PlaybackStatus {
            self.status
                .get(&playback)
                .copied()
                .unwrap_or(PlaybackStatus::Finished)
        }
    }

    const TICK: Duration = Duration::from_millis(30);

    fn speaker() -> Speaker {
        Speaker::new("Rintsuki", None)
    }

    fn line(primary: &str, secondary: &str) -> DialogueLine {
        DialogueLine::new(BilingualText::new(primary, secondary))
    }

    fn completions(signals: &[SessionSignal]) -> usize {
        signals
            .iter()
            .filter(|s| matches!(s, SessionSignal::Completed(_)))
            .count()
    }

    fn reveal_fully(
        session: &mut DialogueSession,
        surface: &mut FakeSurface,
        voice: &mut FakeVoice,
    ) {
        for _ in 0..1000 {
            if session.phase() != SessionPhase::Revealing {
                return;
            }
            session.tick(TICK, surface, voice);
        }
        panic!("reveal never finished");
    }

    #[test]
    fn test_two_line_script_reveals_and_completes_once() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(
            speaker(),
            vec![line("0123456789", "abcd"), line("wxyz", "ab")],
        );
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        assert!(surface.visible);
        assert_eq!(session.phase(), SessionPhase::Revealing);
        assert_eq!(session.reveal_progress(), Some(0));

        for _ in 0..9 {
            session.tick(TICK, &mut surface, &mut voice);
        }
        assert_eq!(session.phase(), SessionPhase::Revealing);
        assert_eq!(session.reveal_progress(), Some(9));

        session.tick(TICK, &mut surface, &mut voice);
        assert_eq!(session.phase(), SessionPhase::AwaitingAdvance);
        assert_eq!(session.reveal_progress(), Some(10));
        assert_eq!(surface.primary, "0123456789");
        assert_eq!(surface.secondary, "abcd");

        assert!(session.advance(&mut surface, &mut voice));
        assert_eq!(session.cursor(), Some(1));
        reveal_fully(&mut session, &mut surface, &mut voice);
        assert_eq!(surface.primary, "wxyz");

        assert!(session.advance(&mut surface, &mut voice));
        assert!(session.is_closed());
        assert!(!surface.visible);

        let signals = session.take_signals();
        assert_eq!(signals, vec![SessionSignal::Completed(None)]);
        assert!(!session.advance(&mut surface, &mut voice));
        assert!(session.take_signals().is_empty());
    }

    #[test]
    fn test_reveal_is_monotonic_under_uneven_frames() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(
            speaker(),
            vec![line("Hey, Void! Long time no see.", "やあ、ヴォイド！久しぶりだね。")],
        );
        let target = script.lines[0].text.reveal_len();
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);

        let frames = [7u64, 45, 0, 90, 31, 16, 16, 200, 3, 61];
        let mut last = 0;
        let mut frame = 0;
        while session.phase() == SessionPhase::Revealing {
            let dt = Duration::from_millis(frames[frame % frames.len()]);
            session.tick(dt, &mut surface, &mut voice);
            let progress = session.reveal_progress().expect("line session");
            assert!(progress >= last, "reveal went backwards");
            assert!(progress <= target);
            last = progress;
            frame += 1;
        }
        assert_eq!(last, target);
        assert_eq!(surface.primary, "Hey, Void! Long time no see.");
        assert_eq!(surface.secondary, "やあ、ヴォイド！久しぶりだね。");
    }

    #[test]
    fn test_shorter_channel_stops_while_longer_continues() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(speaker(), vec![line("ab", "あいうえお")]);
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        for _ in 0..3 {
            session.tick(TICK, &mut surface, &mut voice);
        }
        assert_eq!(surface.primary, "ab");
        assert_eq!(surface.secondary, "あいう");
        assert_eq!(session.phase(), SessionPhase::Revealing);
        session.tick(TICK, &mut surface, &mut voice);
        session.tick(TICK, &mut surface, &mut voice);
        assert_eq!(session.phase(), SessionPhase::AwaitingAdvance);
    }

    #[test]
    fn test_continue_is_ignored_while_revealing() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(speaker(), vec![line("hello", "")]);
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        session.tick(TICK, &mut surface, &mut voice);
        assert!(!session.advance(&mut surface, &mut voice));
        assert_eq!(session.cursor(), Some(0));
        assert_eq!(session.phase(), SessionPhase::Revealing);
    }

    #[test]
    fn test_choices_render_after_reveal_and_fire_once() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let greeting = line("Hi", "やあ")
            .with_choice("Listen to Voice Message", DialogueAction::ListenToMessage(NpcId::Howl))
            .with_choice("Leave", DialogueAction::Leave);
        let script = DialogueScript::new(speaker(), vec![greeting]);
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);

        assert!(surface.choices.is_empty());
        reveal_fully(&mut session, &mut surface, &mut voice);
        assert_eq!(session.phase(), SessionPhase::AwaitingChoice);
        assert_eq!(surface.choices.len(), 2);

        assert!(session.secondary(&mut surface, &mut voice));
        assert!(surface.choices.is_empty());
        assert!(session.is_closed());
        assert_eq!(
            session.take_signals(),
            vec![
                SessionSignal::ChoiceSelected(DialogueAction::Leave),
                SessionSignal::Completed(None),
            ]
        );
    }

    #[test]
    fn test_continue_picks_first_choice() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let greeting = line("Hi", "")
            .with_choice("Listen", DialogueAction::ListenToMessage(NpcId::Howl))
            .with_choice("Leave", DialogueAction::Leave);
        let script = DialogueScript::new(speaker(), vec![greeting, line("bye", "")]);
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        reveal_fully(&mut session, &mut surface, &mut voice);

        assert!(session.advance(&mut surface, &mut voice));
        assert_eq!(session.cursor(), Some(1));
        assert_eq!(
            session.take_signals(),
            vec![SessionSignal::ChoiceSelected(DialogueAction::ListenToMessage(NpcId::Howl))]
        );
    }

    #[test]
    fn test_invalid_choice_selection_is_rejected() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(
            speaker(),
            vec![line("a", "").with_choice("only", DialogueAction::Leave), line("b", "")],
        );
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        assert_eq!(
            session.select_choice(0, &mut surface, &mut voice),
            Err(DialogueError::NotAwaitingChoice)
        );
        reveal_fully(&mut session, &mut surface, &mut voice);
        assert_eq!(
            session.select_choice(5, &mut surface, &mut voice),
            Err(DialogueError::NoSuchChoice(5))
        );
        assert!(!session.secondary(&mut surface, &mut voice));
        assert_eq!(
            session.select_choice(0, &mut surface, &mut voice),
            Ok(DialogueAction::Leave)
        );
        reveal_fully(&mut session, &mut surface, &mut voice);
        assert_eq!(
            session.select_choice(0, &mut surface, &mut voice),
            Err(DialogueError::NotAwaitingChoice)
        );
    }

    #[test]
    fn test_empty_script_completes_once_without_showing() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(speaker(), vec![])
            .on_complete(DialogueAction::MarkVisited(NpcId::Mel));
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        assert!(session.is_closed());
        assert_eq!(surface.shows, 0);
        session.skip(&mut surface, &mut voice);
        assert_eq!(
            session.take_signals(),
            vec![SessionSignal::Completed(Some(DialogueAction::MarkVisited(NpcId::Mel)))]
        );
    }

    #[test]
    fn test_empty_line_waits_for_continue() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(speaker(), vec![DialogueLine::new(BilingualText::primary_only(""))]);
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        assert_eq!(session.phase(), SessionPhase::AwaitingAdvance);
        assert!(session.advance(&mut surface, &mut voice));
        assert!(session.is_closed());
    }

    #[test]
    fn test_at_most_one_voice_clip_plays() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(
            speaker(),
            vec![
                line("one", "").with_voice(VoiceClip::new("one.ogg")),
                line("two", ""),
                line("three", "").with_voice(VoiceClip::new("three.ogg")),
            ],
        );
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        // Voice is already playing before any text is revealed.
        assert_eq!(voice.started, vec!["one.ogg".to_string()]);
        assert_eq!(surface.primary, "");

        while !session.is_closed() {
            reveal_fully(&mut session, &mut surface, &mut voice);
            assert!(voice.live.len() <= 1);
            session.advance(&mut surface, &mut voice);
            assert!(voice.live.len() <= 1);
        }
        assert_eq!(voice.max_live, 1);
        assert!(voice.live.is_empty());
        assert_eq!(voice.started.len(), 2);
    }

    #[test]
    fn test_missing_line_voice_falls_back_to_text() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        voice.fail = true;
        let script = DialogueScript::new(
            speaker(),
            vec![line("still here", "").with_voice(VoiceClip::new("missing.ogg"))],
        );
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        assert_eq!(session.active_voice(), None);
        reveal_fully(&mut session, &mut surface, &mut voice);
        assert_eq!(surface.primary, "still here");
    }

    #[test]
    fn test_skip_mid_reveal_tears_everything_down() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let script = DialogueScript::new(
            speaker(),
            vec![line("a long line of text", "").with_voice(VoiceClip::new("v.ogg"))],
        );
        let mut session = DialogueSession::start(script, SequencerTiming::default(), &mut surface, &mut voice);
        session.tick(TICK, &mut surface, &mut voice);
        session.skip(&mut surface, &mut voice);
        assert!(voice.live.is_empty());
        assert!(!surface.visible);

        let frozen = surface.primary.clone();
        for _ in 0..20 {
            session.tick(TICK, &mut surface, &mut voice);
        }
        assert_eq!(surface.primary, frozen);
        assert_eq!(completions(&session.take_signals()), 1);
    }

    fn rintsuki_track() -> SyncedScript {
        let track = SubtitleTrack::new(
            VoiceClip::new("voices/rintsuki.ogg"),
            vec![
                SubtitleCue::new(0.0, "Happy Birthday, Void!", "ハッピーバースデー、ヴォイド！"),
                SubtitleCue::new(2.7, "Happy Birthday (in japanese :D)", "お誕生日おめでとう。"),
                SubtitleCue::new(4.2, "Let's continue to get along! <3", "これからも、仲良くしようね。"),
            ],
        )
        .expect("valid track");
        SyncedScript {
            speaker: speaker(),
            track,
            on_complete: Some(DialogueAction::MarkVisited(NpcId::Rintsuki)),
        }
    }

    #[test]
    fn test_synced_track_follows_playback_position() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let mut session =
            DialogueSession::start_synced(rintsuki_track(), SequencerTiming::default(), &mut surface, &mut voice);
        assert_eq!(session.phase(), SessionPhase::PlayingTrack);
        assert_eq!(surface.primary, "Happy Birthday, Void!");
        let id = session.active_voice().expect("track playing");

        voice.set(id, PlaybackStatus::Playing { position_secs: 3.0 });
        session.tick(Duration::from_millis(100), &mut surface, &mut voice);
        assert_eq!(session.active_cue(), Some(0), "no poll before 200ms");
        session.tick(Duration::from_millis(100), &mut surface, &mut voice);
        assert_eq!(session.active_cue(), Some(1));
        assert_eq!(surface.secondary, "お誕生日おめでとう。");

        voice.set(id, PlaybackStatus::Playing { position_secs: 9.0 });
        session.tick(Duration::from_millis(200), &mut surface, &mut voice);
        assert_eq!(session.active_cue(), Some(2));

        voice.set(id, PlaybackStatus::Finished);
        session.tick(Duration::from_millis(16), &mut surface, &mut voice);
        assert!(session.is_closed());
        assert!(voice.live.is_empty());
        assert_eq!(
            session.take_signals(),
            vec![SessionSignal::Completed(Some(DialogueAction::MarkVisited(NpcId::Rintsuki)))]
        );
    }

    #[test]
    fn test_skip_then_natural_finish_completes_once() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        let mut session =
            DialogueSession::start_synced(rintsuki_track(), SequencerTiming::default(), &mut surface, &mut voice);
        let id = session.active_voice().expect("track playing");
        session.skip(&mut surface, &mut voice);
        voice.set(id, PlaybackStatus::Finished);
        session.tick(Duration::from_millis(200), &mut surface, &mut voice);
        session.skip(&mut surface, &mut voice);
        assert_eq!(completions(&session.take_signals()), 1);
    }

    #[test]
    fn test_unavailable_recording_runs_on_session_clock() {
        let (mut surface, mut voice) = (FakeSurface::default(), FakeVoice::default());
        voice.fail = true;
        let mut session =
            DialogueSession::start_synced(rintsuki_track(), SequencerTiming::default(), &mut surface, &mut voice);
        assert_eq!(session.active_voice(), None);

        let step = Duration::from_millis(200);
        // Last cue at 4.2s plus a 4s tail.
        for _ in 0..15 {
            session.tick(step, &mut surface, &mut voice);
        }
        assert_eq!(session.active_cue(), Some(1));
        for _ in 0..25 {
            session.tick(step, &mut surface, &mut voice);
        }
        assert_eq!(session.active_cue(), Some(2));
        assert!(!session.is_closed());
        for _ in 0..2 {
            session.tick(step, &mut surface, &mut voice);
        }
        assert!(session.is_closed());
        assert_eq!(completions(&session.take_signals()), 1);
    }

    #[test]
    fn test_char_prefix_respects_multibyte() {
        assert_eq!(char_prefix("ヴォイド", 2), "ヴォ");
        assert_eq!(char_prefix("ab", 5), "ab");
        assert_eq!(char_prefix("", 0), "");
    }
}
