//! Event-bus protocol shared by all engine components.
//!
//! This module defines all message payloads exchanged between the playback
//! engine, the presence notifier, and the host session that owns the bus.
//! The host issues commands as [`PlayerMessage`] variants and observes
//! committed state through [`PlayerMessage::PlaybackChanged`] snapshots; it
//! never reaches into engine state directly.

use crate::song::Song;

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone)]
pub enum Message {
    Player(PlayerMessage),
    Presence(PresenceMessage),
}

/// Player-domain commands and notifications.
#[derive(Debug, Clone)]
pub enum PlayerMessage {
    /// Seed the queue at session start. Ignored while a queue is already
    /// loaded so a view remount cannot reset an in-progress session.
    InitializeQueue(Vec<Song>),
    /// Replace the queue wholesale and start playing at `start_index`.
    PlayFromList {
        songs: Vec<Song>,
        start_index: usize,
    },
    /// Select a specific song, adopting its queue position when the queue
    /// contains it. `None` is a no-op.
    SetCurrentSong(Option<Song>),
    /// Flip play/pause.
    TogglePlay,
    /// Advance to the next song per shuffle/loop modes.
    Next,
    /// Step back to the previous song. Backward travel never wraps.
    Previous,
    /// Toggle shuffle mode.
    ToggleShuffle,
    /// Toggle loop mode. Loop only affects forward wraparound.
    ToggleLoop,
    /// Committed state snapshot, broadcast after every transition.
    PlaybackChanged(PlaybackSnapshot),
    /// Terminate the engine run loops.
    Shutdown,
}

/// Presence-domain traffic.
#[derive(Debug, Clone)]
pub enum PresenceMessage {
    /// One-way "what this user is doing" update for the chat service.
    UpdateActivity(ActivityUpdate),
}

/// State snapshot delivered to bus subscribers after each committed
/// transition. Carries everything a host view or media binding needs to
/// render without polling the engine.
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub current_song: Option<Song>,
    pub current_index: Option<usize>,
    pub queue_len: usize,
    pub is_playing: bool,
    pub is_shuffled: bool,
    pub is_looped: bool,
}

/// Payload of the `update_activity` presence event.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    pub user_id: String,
    pub activity: String,
}

impl ActivityUpdate {
    /// Activity text for an actively playing song.
    pub fn playing(user_id: &str, song: &Song) -> Self {
        Self {
            user_id: user_id.to_string(),
            activity: format!("Playing {} by {}", song.title, song.artist),
        }
    }

    /// Activity text for a paused or stopped player.
    pub fn idle(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            activity: "Idle".to_string(),
        }
    }

    /// JSON body of the `update_activity` event as the chat service expects
    /// it. Serializing two string fields cannot fail.
    pub fn to_wire_json(&self) -> String {
        serde_json::to_string(self).expect("activity update serializes to JSON")
    }
}
