//! Playback facade: owns the play state and drives every transition.
//!
//! The manager is the single owner of the queue, the current-song selection,
//! and the play/shuffle/loop flags. Commands arrive as
//! [`PlayerMessage`] variants over the bus (or as direct method calls when
//! the host embeds the manager without threads); every committed transition
//! broadcasts a [`PlayerMessage::PlaybackChanged`] snapshot, and transitions
//! that change the current song or the playing flag additionally emit a
//! presence update. Presence emission always follows the state commit and is
//! fire-and-forget.

use log::{debug, warn};
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::broadcast::{error::RecvError, Receiver, Sender};

use crate::{
    config::EngineConfig,
    navigation::{self, Direction, NavTarget},
    protocol::{ActivityUpdate, Message, PlaybackSnapshot, PlayerMessage, PresenceMessage},
    queue::PlayQueue,
    shuffle::{self, ShuffleRestore},
    song::Song,
};

/// Manages the playback state machine for one listening session.
pub struct PlayerManager {
    queue: PlayQueue,
    current_song: Option<Song>,
    is_playing: bool,
    is_shuffled: bool,
    is_looped: bool,
    /// Pre-shuffle order, kept only while shuffled and only under the
    /// snapshot restore strategy.
    unshuffled_order: Option<Vec<Song>>,
    restore: ShuffleRestore,
    /// Presence updates are suppressed when the session has no
    /// authenticated user.
    user_id: Option<String>,
    bus_consumer: Receiver<Message>,
    bus_producer: Sender<Message>,
    // StdRng rather than ThreadRng so the manager stays Send.
    rng: StdRng,
}

impl PlayerManager {
    pub fn new(
        config: &EngineConfig,
        user_id: Option<String>,
        bus_consumer: Receiver<Message>,
        bus_producer: Sender<Message>,
    ) -> Self {
        let mut seed = [0u8; 32];
        getrandom::fill(&mut seed).expect("Failed to generate random seed");
        Self::with_seed(config, user_id, bus_consumer, bus_producer, seed)
    }

    /// Build a manager with a fixed RNG seed so shuffle decisions are
    /// reproducible.
    pub fn with_seed(
        config: &EngineConfig,
        user_id: Option<String>,
        bus_consumer: Receiver<Message>,
        bus_producer: Sender<Message>,
        seed: [u8; 32],
    ) -> Self {
        Self {
            queue: PlayQueue::new(),
            current_song: None,
            is_playing: false,
            is_shuffled: false,
            is_looped: false,
            unshuffled_order: None,
            restore: config.shuffle.restore,
            user_id,
            bus_consumer,
            bus_producer,
            rng: StdRng::from_seed(seed),
        }
    }

    /// Process bus commands until shutdown.
    pub fn run(&mut self) {
        loop {
            match self.bus_consumer.blocking_recv() {
                Ok(Message::Player(command)) => {
                    if !self.handle(command) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "PlayerManager: lagged on control bus, skipped {} message(s)",
                        skipped
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn handle(&mut self, command: PlayerMessage) -> bool {
        match command {
            PlayerMessage::InitializeQueue(songs) => self.initialize_queue(songs),
            PlayerMessage::PlayFromList { songs, start_index } => {
                self.play_from_list(songs, start_index)
            }
            PlayerMessage::SetCurrentSong(song) => self.set_current_song(song),
            PlayerMessage::TogglePlay => self.toggle_play(),
            PlayerMessage::Next => self.play_next(),
            PlayerMessage::Previous => self.play_previous(),
            PlayerMessage::ToggleShuffle => self.toggle_shuffle(),
            PlayerMessage::ToggleLoop => self.toggle_loop(),
            // Own notification echoed back on the shared bus.
            PlayerMessage::PlaybackChanged(_) => {}
            PlayerMessage::Shutdown => {
                debug!("PlayerManager: shutting down");
                return false;
            }
        }
        true
    }

    /// Seed the queue at session start.
    ///
    /// A no-op while a queue is already loaded, so a view remount cannot
    /// reset an in-progress session. An already-selected current song is
    /// left alone; otherwise the first element becomes current without
    /// starting playback.
    pub fn initialize_queue(&mut self, songs: Vec<Song>) {
        if !self.queue.is_empty() {
            debug!("PlayerManager: queue already loaded, ignoring InitializeQueue");
            return;
        }
        if songs.is_empty() {
            return;
        }

        debug!("PlayerManager: initializing queue with {} song(s)", songs.len());
        match &self.current_song {
            Some(current) => {
                // Keep the existing selection; adopt its position when the
                // incoming list contains it.
                let index = songs.iter().position(|song| song.id == current.id);
                self.queue.replace(songs, index);
            }
            None => {
                self.queue.replace(songs, Some(0));
                self.current_song = self.queue.current().cloned();
            }
        }
        self.broadcast_playback_changed();
    }

    /// Replace the queue wholesale and start playback at `start_index`.
    /// Empty lists and out-of-range start indices are no-ops.
    pub fn play_from_list(&mut self, songs: Vec<Song>, start_index: usize) {
        if songs.is_empty() {
            debug!("PlayerManager: ignoring PlayFromList with an empty list");
            return;
        }
        if start_index >= songs.len() {
            warn!(
                "PlayerManager: PlayFromList start index {} out of range for {} song(s)",
                start_index,
                songs.len()
            );
            return;
        }

        debug!(
            "PlayerManager: playing list of {} song(s) from index {}",
            songs.len(),
            start_index
        );
        self.queue.replace(songs, Some(start_index));
        self.current_song = self.queue.current().cloned();
        self.is_playing = true;
        // Any retained pre-shuffle order refers to the replaced queue.
        self.unshuffled_order = None;
        self.notify_presence_playing();
        self.broadcast_playback_changed();
    }

    /// Make `song` current and start playing it.
    ///
    /// When the queue contains the song, the index follows it. An
    /// out-of-queue song still becomes current while the index keeps its
    /// previous value; that is the one deliberate gap in the index/song
    /// pairing, so callers can play a song without queueing it.
    pub fn set_current_song(&mut self, song: Option<Song>) {
        let Some(song) = song else {
            return;
        };

        match self.queue.position_of(&song.id) {
            Some(index) => self.queue.select(Some(index)),
            None => debug!(
                "PlayerManager: song {} not in queue, keeping current index",
                song.id
            ),
        }
        self.current_song = Some(song);
        self.is_playing = true;
        self.notify_presence_playing();
        self.broadcast_playback_changed();
    }

    /// Flip play/pause. Pausing reports the user as idle; toggling with
    /// nothing selected stays paused and also reports idle.
    pub fn toggle_play(&mut self) {
        let starting = !self.is_playing && self.current_song.is_some();
        self.is_playing = starting;
        if starting {
            self.notify_presence_playing();
        } else {
            self.notify_presence_idle();
        }
        self.broadcast_playback_changed();
    }

    /// Advance to the next song, honoring shuffle and loop modes.
    pub fn play_next(&mut self) {
        self.step(Direction::Forward);
    }

    /// Step back to the previous song. Backward travel never wraps.
    pub fn play_previous(&mut self) {
        self.step(Direction::Backward);
    }

    fn step(&mut self, direction: Direction) {
        if self.queue.is_empty() {
            // Nothing queued: degrade to idle rather than fail.
            self.is_playing = false;
            self.notify_presence_idle();
            self.broadcast_playback_changed();
            return;
        }

        let target = navigation::resolve(
            direction,
            self.queue.current_index(),
            self.queue.len(),
            self.is_shuffled,
            self.is_looped,
            &mut self.rng,
        );
        match target {
            NavTarget::Move(index) => {
                self.queue.select(Some(index));
                self.current_song = self.queue.current().cloned();
                self.is_playing = true;
                self.notify_presence_playing();
            }
            NavTarget::Stop => {
                self.is_playing = false;
                self.notify_presence_idle();
            }
        }
        self.broadcast_playback_changed();
    }

    /// Toggle shuffle mode.
    ///
    /// Switching on pins the current song to the front of a fresh
    /// permutation of the rest. Switching off recovers an order per the
    /// configured restore strategy and re-selects the current song's
    /// position in it. Neither direction touches the playing flag or emits
    /// presence.
    pub fn toggle_shuffle(&mut self) {
        if self.queue.is_empty() {
            self.is_shuffled = !self.is_shuffled;
            self.broadcast_playback_changed();
            return;
        }

        if !self.is_shuffled {
            debug!("PlayerManager: enabling shuffle");
            if self.restore == ShuffleRestore::Snapshot {
                self.unshuffled_order = Some(self.queue.songs().to_vec());
            }
            let order =
                shuffle::shuffled_order(self.queue.songs(), self.queue.current_index(), &mut self.rng);
            let new_index = self.queue.current_index().map(|_| 0);
            self.queue.reorder(order, new_index);
            self.is_shuffled = true;
        } else {
            debug!("PlayerManager: disabling shuffle");
            let current_id = self.queue.current().map(|song| song.id.clone());
            let order = shuffle::restored_order(
                self.queue.songs(),
                self.unshuffled_order.as_deref(),
                self.restore,
            );
            let new_index = current_id
                .as_deref()
                .and_then(|id| order.iter().position(|song| song.id == id));
            self.queue.reorder(order, new_index);
            self.unshuffled_order = None;
            self.is_shuffled = false;
        }
        self.broadcast_playback_changed();
    }

    /// Flip loop mode. No other state is touched.
    pub fn toggle_loop(&mut self) {
        self.is_looped = !self.is_looped;
        self.broadcast_playback_changed();
    }

    pub fn current_song(&self) -> Option<&Song> {
        self.current_song.as_ref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    pub fn queue_songs(&self) -> &[Song] {
        self.queue.songs()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn is_looped(&self) -> bool {
        self.is_looped
    }

    /// Committed state snapshot for bus subscribers.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_song: self.current_song.clone(),
            current_index: self.queue.current_index(),
            queue_len: self.queue.len(),
            is_playing: self.is_playing,
            is_shuffled: self.is_shuffled,
            is_looped: self.is_looped,
        }
    }

    fn notify_presence_playing(&self) {
        let Some(user_id) = &self.user_id else {
            return;
        };
        let Some(song) = &self.current_song else {
            return;
        };
        let _ = self.bus_producer.send(Message::Presence(
            PresenceMessage::UpdateActivity(ActivityUpdate::playing(user_id, song)),
        ));
    }

    fn notify_presence_idle(&self) {
        let Some(user_id) = &self.user_id else {
            return;
        };
        let _ = self.bus_producer.send(Message::Presence(
            PresenceMessage::UpdateActivity(ActivityUpdate::idle(user_id)),
        ));
    }

    fn broadcast_playback_changed(&self) {
        let _ = self
            .bus_producer
            .send(Message::Player(PlayerMessage::PlaybackChanged(self.snapshot())));
    }
}
