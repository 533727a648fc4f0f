//! Engine lifecycle: bus construction, service spawning, shutdown.
//!
//! One [`EngineRuntime`] per listening session. The host constructs it with
//! its configuration, the session's user id, and a presence transport, then
//! drives playback by sending [`crate::protocol::PlayerMessage`] commands
//! through the handle and observing `PlaybackChanged` snapshots on a
//! subscription.

use std::thread::{self, JoinHandle};

use log::{info, warn};
use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::{
    config::{sanitize_config, EngineConfig},
    player_manager::PlayerManager,
    presence::{ActivityTransport, PresenceNotifier},
    protocol::{Message, PlayerMessage},
};

/// A running playback engine: one player manager and one presence notifier
/// on their own threads, joined by a broadcast bus.
pub struct EngineRuntime {
    bus_sender: Sender<Message>,
    player_thread: Option<JoinHandle<()>>,
    presence_thread: Option<JoinHandle<()>>,
}

impl EngineRuntime {
    /// Build the bus and launch both services.
    pub fn start(
        config: EngineConfig,
        user_id: Option<String>,
        transport: Box<dyn ActivityTransport>,
    ) -> Self {
        let config = sanitize_config(config);
        let (bus_sender, _) = broadcast::channel(config.bus_capacity);

        let player_receiver = bus_sender.subscribe();
        let player_sender = bus_sender.clone();
        let player_thread = thread::spawn(move || {
            let mut manager =
                PlayerManager::new(&config, user_id, player_receiver, player_sender);
            manager.run();
        });

        let presence_receiver = bus_sender.subscribe();
        let presence_thread = thread::spawn(move || {
            let mut notifier = PresenceNotifier::new(presence_receiver, transport);
            notifier.run();
        });

        info!("EngineRuntime: playback engine started");
        Self {
            bus_sender,
            player_thread: Some(player_thread),
            presence_thread: Some(presence_thread),
        }
    }

    /// Sender for issuing player commands.
    pub fn sender(&self) -> Sender<Message> {
        self.bus_sender.clone()
    }

    /// Subscribe to engine notifications: `PlaybackChanged` snapshots and
    /// presence traffic.
    pub fn subscribe(&self) -> Receiver<Message> {
        self.bus_sender.subscribe()
    }

    /// Stop both services and join their threads.
    pub fn shutdown(mut self) {
        let _ = self
            .bus_sender
            .send(Message::Player(PlayerMessage::Shutdown));
        for handle in [self.player_thread.take(), self.presence_thread.take()]
            .into_iter()
            .flatten()
        {
            if handle.join().is_err() {
                warn!("EngineRuntime: engine thread panicked during shutdown");
            }
        }
        info!("EngineRuntime: playback engine stopped");
    }
}
