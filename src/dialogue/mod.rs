//! Dialogue domain: scripts, the sequencer, NPC profiles, and the driver
//! that runs one conversation at a time while in `GameState::Dialogue`.
//!
//! Flow for an NPC: the gate sends a `ConversationRequest` with the
//! greeting. Picking "Listen" queues that NPC's message, which starts one
//! configured delay after the greeting closes. The message's completion
//! marks the NPC visited. The state returns to `Overworld` once nothing is
//! open and nothing is queued.

pub mod roster;
pub mod script;
pub mod session;
pub mod view;

pub use roster::{NpcProfile, NpcRegistry, RecordedMessage};
pub use script::*;
pub use session::{
    ConversationSurface, DialogueError, DialogueSession, SequencerTiming, SessionPhase,
    SessionSignal, VoicePlayer,
};
pub use view::DialogueView;

use bevy::prelude::*;

use crate::audio::VoiceChannel;
use crate::config::ShrineConfig;
use crate::quests::QuestLedger;
use crate::shared::*;

pub struct DialoguePlugin;

impl Plugin for DialoguePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogueView>()
            .init_resource::<Conversation>()
            .init_resource::<VoiceChannel>()
            .init_resource::<NpcRegistry>()
            .add_event::<ConversationRequest>()
            .add_event::<QuestProgressEvent>()
            .add_systems(
                Update,
                (
                    begin_requested_conversation,
                    drive_conversation.run_if(in_state(GameState::Dialogue)),
                )
                    .chain(),
            )
            .add_systems(OnExit(GameState::Dialogue), close_abandoned_conversation);
    }
}

/// Ask for a conversation. Ignored (with a warning) while one is open.
#[derive(Event, Debug, Clone)]
pub struct ConversationRequest {
    pub script: ConversationScript,
}

#[derive(Debug)]
struct PendingMessage {
    npc: NpcId,
    delay: Timer,
}

/// The single conversation slot shared by every caller.
#[derive(Resource, Debug, Default)]
pub struct Conversation {
    session: Option<DialogueSession>,
    pending: Option<PendingMessage>,
}

impl Conversation {
    pub fn begin(
        &mut self,
        script: ConversationScript,
        timing: SequencerTiming,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) -> Result<(), DialogueError> {
        if !self.is_idle() {
            return Err(DialogueError::SurfaceBusy);
        }
        self.start(script, timing, surface, audio);
        Ok(())
    }

    fn start(
        &mut self,
        script: ConversationScript,
        timing: SequencerTiming,
        surface: &mut dyn ConversationSurface,
        audio: &mut dyn VoicePlayer,
    ) {
        let session = match script {
            ConversationScript::Lines(script) => {
                DialogueSession::start(script, timing, surface, audio)
            }
            ConversationScript::Track(script) => {
                DialogueSession::start_synced(script, timing, surface, audio)
            }
        };
        self.session = Some(session);
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none() && self.pending.is_none()
    }

    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    /// NPC whose message is waiting for its start delay.
    pub fn pending_message(&self) -> Option<NpcId> {
        self.pending.as_ref().map(|pending| pending.npc)
    }
}

pub fn begin_requested_conversation(
    mut requests: EventReader<ConversationRequest>,
    config: Res<ShrineConfig>,
    mut conversation: ResMut<Conversation>,
    mut view: ResMut<DialogueView>,
    mut voice: ResMut<VoiceChannel>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for request in requests.read() {
        let timing = SequencerTiming::from_config(&config);
        match conversation.begin(request.script.clone(), timing, &mut *view, &mut *voice) {
            Ok(()) => next_state.set(GameState::Dialogue),
            Err(err) => warn!("[Dialogue] conversation request ignored: {err}"),
        }
    }
}

/// Routes input into the open session, ticks it, starts queued messages,
/// and applies whatever the session signalled.
pub fn drive_conversation(
    time: Res<Time>,
    input: Res<PlayerInput>,
    config: Res<ShrineConfig>,
    registry: Res<NpcRegistry>,
    mut conversation: ResMut<Conversation>,
    mut view: ResMut<DialogueView>,
    mut voice: ResMut<VoiceChannel>,
    mut ledger: ResMut<QuestLedger>,
    mut progress: EventWriter<QuestProgressEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let timing = SequencerTiming::from_config(&config);
    let conversation = &mut *conversation;
    let surface: &mut dyn ConversationSurface = &mut *view;
    let audio: &mut dyn VoicePlayer = &mut *voice;

    let mut input_used = false;
    if let Some(pending) = conversation.pending.as_mut() {
        input_used = true;
        if input.cancel {
            info!("[Dialogue] message from {:?} abandoned", pending.npc);
            conversation.pending = None;
        } else if pending.delay.tick(time.delta()).finished() {
            let npc = pending.npc;
            conversation.pending = None;
            match registry.get(npc) {
                Some(profile) => conversation.start(profile.message_script(), timing, surface, audio),
                None => warn!("[Dialogue] {:?} has no recorded message", npc),
            }
        }
    }

    let mut signals = Vec::new();
    if let Some(session) = conversation.session.as_mut() {
        if !input_used {
            if input.cancel {
                session.skip(surface, audio);
            } else if let Some(index) = input.select_choice {
                if let Err(err) = session.select_choice(index, surface, audio) {
                    debug!("[Dialogue] choice {} ignored: {err}", index + 1);
                }
            } else if input.advance {
                session.advance(surface, audio);
            } else if input.secondary {
                session.secondary(surface, audio);
            }
        }
        session.tick(time.delta(), surface, audio);
        signals = session.take_signals();
    }

    for signal in signals {
        let action = match signal {
            SessionSignal::ChoiceSelected(action) => Some(action),
            SessionSignal::Completed(action) => {
                conversation.session = None;
                action
            }
        };
        match action {
            Some(DialogueAction::ListenToMessage(npc)) => {
                info!("[Dialogue] {:?}'s message queued", npc);
                conversation.pending = Some(PendingMessage {
                    npc,
                    delay: Timer::new(config.message_delay(), TimerMode::Once),
                });
            }
            Some(DialogueAction::MarkVisited(npc)) => {
                if ledger.mark_visited(npc) {
                    progress.send(QuestProgressEvent {
                        milestone: Milestone::NpcVisited(npc),
                    });
                }
            }
            Some(DialogueAction::Leave) => info!("[Dialogue] player left the conversation"),
            None => {}
        }
    }

    if conversation.is_idle() {
        next_state.set(GameState::Overworld);
    }
}

/// Leaving `Dialogue` for any reason tears down what is still open.
fn close_abandoned_conversation(
    mut conversation: ResMut<Conversation>,
    mut view: ResMut<DialogueView>,
    mut voice: ResMut<VoiceChannel>,
) {
    conversation.pending = None;
    if let Some(mut session) = conversation.session.take() {
        session.skip(&mut *view, &mut *voice);
        warn!(
            "[Dialogue] conversation with {} closed by a state change",
            session.speaker().name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::BilingualText;

    fn greeting() -> ConversationScript {
        ConversationScript::Lines(DialogueScript::new(
            Speaker::new("Risu", None),
            vec![DialogueLine::new(BilingualText::new("Hi", "やあ"))],
        ))
    }

    #[test]
    fn test_second_conversation_is_rejected_while_open() {
        let mut conversation = Conversation::default();
        let mut view = DialogueView::default();
        let mut voice = VoiceChannel::default();
        let timing = SequencerTiming::default();

        assert!(conversation.begin(greeting(), timing, &mut view, &mut voice).is_ok());
        assert!(view.visible);
        assert_eq!(
            conversation.begin(greeting(), timing, &mut view, &mut voice),
            Err(DialogueError::SurfaceBusy)
        );
        assert_eq!(view.speaker.as_ref().map(|s| s.name.as_str()), Some("Risu"));
    }
}
