//! Sound effects and the voice channel.
//!
//! `VoiceChannel` is the dialogue sequencer's view of audio: it hands out
//! playback ids immediately and records what the sequencer asked for.
//! `drive_voice_channel` turns those requests into Bevy audio entities
//! and reports positions, completion and load failures back into it.
//! Without an `AssetServer` (headless) every clip reports unavailable,
//! which degrades sessions to text only.

use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::audio::AudioSinkPlayback;
use bevy::prelude::*;
use bevy::time::Stopwatch;

use crate::dialogue::session::{AudioError, PlaybackId, PlaybackStatus, VoicePlayer};
use crate::dialogue::VoiceClip;
use crate::shared::*;

pub struct SoundPlugin;

impl Plugin for SoundPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<VoiceChannel>()
            .add_event::<PlaySfxEvent>()
            .add_systems(Update, (handle_play_sfx, drive_voice_channel));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SFX PATH MAPPING
// ═══════════════════════════════════════════════════════════════════════

fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "arrow_hit" => Some("audio/sfx/arrow_hit.ogg"),
        "arrow_miss" => Some("audio/sfx/arrow_miss.ogg"),
        "gacha_pull" => Some("audio/sfx/gacha_pull.ogg"),
        "prize_rare" => Some("audio/sfx/prize_rare.ogg"),
        "portal_open" => Some("audio/sfx/portal_open.ogg"),
        "error" => Some("audio/sfx/error.ogg"),
        _ => None,
    }
}

pub fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Option<Res<AssetServer>>,
) {
    let Some(asset_server) = asset_server else {
        events.clear();
        return;
    };
    for event in events.read() {
        match sfx_path(&event.sfx_id) {
            Some(path) => {
                commands.spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings::DESPAWN,
                ));
            }
            None => debug!("[Audio] no sound mapped for {}", event.sfx_id),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// VOICE CHANNEL
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Default)]
pub struct VoiceChannel {
    next_id: u64,
    playbacks: HashMap<PlaybackId, PlaybackStatus>,
    to_spawn: Vec<(PlaybackId, String)>,
    to_stop: Vec<PlaybackId>,
}

impl VoicePlayer for VoiceChannel {
    fn play(&mut self, clip: &VoiceClip) -> Result<PlaybackId, AudioError> {
        if clip.path().trim().is_empty() {
            return Err(AudioError::EmptyPath);
        }
        self.next_id += 1;
        let id = PlaybackId(self.next_id);
        self.playbacks
            .insert(id, PlaybackStatus::Playing { position_secs: 0.0 });
        self.to_spawn.push((id, clip.path().to_string()));
        debug!("[Audio] voice {:?} requested: {}", id, clip.path());
        Ok(id)
    }

    fn stop(&mut self, playback: PlaybackId) {
        if self.playbacks.remove(&playback).is_none() {
            return;
        }
        let queued = self.to_spawn.len();
        self.to_spawn.retain(|(id, _)| *id != playback);
        if self.to_spawn.len() == queued {
            self.to_stop.push(playback);
        }
    }

    fn status(&self, playback: PlaybackId) -> PlaybackStatus {
        self.playbacks
            .get(&playback)
            .copied()
            .unwrap_or(PlaybackStatus::Finished)
    }
}

impl VoiceChannel {
    pub fn report_position(&mut self, playback: PlaybackId, position_secs: f32) {
        if let Some(status) = self.playbacks.get_mut(&playback) {
            if matches!(status, PlaybackStatus::Playing { .. }) {
                *status = PlaybackStatus::Playing { position_secs };
            }
        }
    }

    pub fn report_finished(&mut self, playback: PlaybackId) {
        if let Some(status) = self.playbacks.get_mut(&playback) {
            *status = PlaybackStatus::Finished;
        }
    }

    pub fn report_unavailable(&mut self, playback: PlaybackId) {
        if let Some(status) = self.playbacks.get_mut(&playback) {
            *status = PlaybackStatus::Unavailable;
        }
    }

    fn take_requests(&mut self) -> (Vec<(PlaybackId, String)>, Vec<PlaybackId>) {
        (
            std::mem::take(&mut self.to_spawn),
            std::mem::take(&mut self.to_stop),
        )
    }
}

/// Audio entity backing one voice playback.
#[derive(Component, Debug)]
pub struct VoicePlayback {
    pub id: PlaybackId,
    handle: Handle<AudioSource>,
    clock: Stopwatch,
}

/// Spawns requested clips, despawns stopped ones, and reports progress.
/// Position comes from a stopwatch that only runs while the sink plays.
pub fn drive_voice_channel(
    mut commands: Commands,
    asset_server: Option<Res<AssetServer>>,
    time: Res<Time>,
    mut channel: ResMut<VoiceChannel>,
    mut playing: Query<(Entity, &mut VoicePlayback, Option<&AudioSink>)>,
) {
    let (spawns, stops) = channel.take_requests();

    let Some(asset_server) = asset_server else {
        for (id, path) in spawns {
            warn!("[Audio] no audio backend; {} is unavailable", path);
            channel.report_unavailable(id);
        }
        return;
    };

    for (id, path) in spawns {
        let handle: Handle<AudioSource> = asset_server.load(path);
        commands.spawn((
            AudioPlayer::new(handle.clone()),
            PlaybackSettings::ONCE,
            VoicePlayback {
                id,
                handle,
                clock: Stopwatch::new(),
            },
        ));
    }

    for (entity, mut playback, sink) in &mut playing {
        let id = playback.id;
        if stops.contains(&id) {
            commands.entity(entity).despawn_recursive();
            continue;
        }
        if matches!(asset_server.load_state(playback.handle.id()), LoadState::Failed(_)) {
            warn!("[Audio] voice clip for {:?} failed to load", id);
            channel.report_unavailable(id);
            commands.entity(entity).despawn_recursive();
            continue;
        }
        // No sink yet: still loading.
        let Some(sink) = sink else { continue };
        if sink.empty() {
            channel.report_finished(id);
            commands.entity(entity).despawn_recursive();
            continue;
        }
        if !sink.is_paused() {
            playback.clock.tick(time.delta());
        }
        channel.report_position(id, playback.clock.elapsed_secs());
    }
}
