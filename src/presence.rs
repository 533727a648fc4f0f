//! Presence notifier: forwards activity updates to the chat service.
//!
//! The notifier is the only component that talks to the presence channel.
//! It consumes [`PresenceMessage`] traffic from the bus and hands each
//! payload to an injected transport; it never holds a reference to the
//! transport's connection internals, and a failed delivery never reaches
//! the playback state machine.

use log::{debug, error, warn};
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::protocol::{ActivityUpdate, Message, PlayerMessage, PresenceMessage};

/// Transport seam for the realtime presence channel.
///
/// Implementations deliver the `update_activity` payload to the chat
/// service over whatever wire the host uses (websocket, HTTP, an
/// in-process sink in tests). Delivery is fire-and-forget; errors are
/// reported back only so they can be logged.
pub trait ActivityTransport: Send {
    fn send_activity(&mut self, update: &ActivityUpdate) -> Result<(), String>;
}

/// Bus-driven notifier in front of an [`ActivityTransport`].
pub struct PresenceNotifier {
    bus_consumer: Receiver<Message>,
    transport: Box<dyn ActivityTransport>,
}

impl PresenceNotifier {
    pub fn new(bus_consumer: Receiver<Message>, transport: Box<dyn ActivityTransport>) -> Self {
        Self {
            bus_consumer,
            transport,
        }
    }

    /// Forward updates until shutdown.
    pub fn run(&mut self) {
        loop {
            match self.bus_consumer.blocking_recv() {
                Ok(Message::Presence(PresenceMessage::UpdateActivity(update))) => {
                    self.forward(&update);
                }
                Ok(Message::Player(PlayerMessage::Shutdown)) => {
                    debug!("PresenceNotifier: shutting down");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "PresenceNotifier: lagged on control bus, skipped {} message(s)",
                        skipped
                    );
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn forward(&mut self, update: &ActivityUpdate) {
        debug!(
            "PresenceNotifier: {} -> {}",
            update.user_id, update.activity
        );
        if let Err(err) = self.transport.send_activity(update) {
            error!("PresenceNotifier: failed to deliver activity update: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};
    use tokio::sync::broadcast;

    #[derive(Clone, Default)]
    struct RecordingTransport {
        delivered: Arc<Mutex<Vec<ActivityUpdate>>>,
        fail_next: Arc<Mutex<bool>>,
    }

    impl ActivityTransport for RecordingTransport {
        fn send_activity(&mut self, update: &ActivityUpdate) -> Result<(), String> {
            let mut fail_next = self.fail_next.lock().expect("fail flag lock poisoned");
            if *fail_next {
                *fail_next = false;
                return Err("socket not connected".to_string());
            }
            self.delivered
                .lock()
                .expect("delivered lock poisoned")
                .push(update.clone());
            Ok(())
        }
    }

    fn update(activity: &str) -> ActivityUpdate {
        ActivityUpdate {
            user_id: "user-1".to_string(),
            activity: activity.to_string(),
        }
    }

    #[test]
    fn test_forwards_updates_in_order() {
        let (bus_sender, _) = broadcast::channel(64);
        let transport = RecordingTransport::default();
        let mut notifier =
            PresenceNotifier::new(bus_sender.subscribe(), Box::new(transport.clone()));

        notifier.forward(&update("Playing One by A"));
        notifier.forward(&update("Idle"));
        notifier.forward(&update("Playing Two by B"));

        let delivered = transport.delivered.lock().expect("delivered lock poisoned");
        let activities: Vec<&str> = delivered.iter().map(|u| u.activity.as_str()).collect();
        assert_eq!(activities, ["Playing One by A", "Idle", "Playing Two by B"]);
    }

    #[test]
    fn test_transport_failure_does_not_stop_later_updates() {
        let (bus_sender, _) = broadcast::channel(64);
        let transport = RecordingTransport::default();
        *transport.fail_next.lock().expect("fail flag lock poisoned") = true;
        let mut notifier =
            PresenceNotifier::new(bus_sender.subscribe(), Box::new(transport.clone()));

        notifier.forward(&update("Playing One by A"));
        notifier.forward(&update("Idle"));

        let delivered = transport.delivered.lock().expect("delivered lock poisoned");
        let activities: Vec<&str> = delivered.iter().map(|u| u.activity.as_str()).collect();
        assert_eq!(activities, ["Idle"]);
    }

    #[test]
    fn test_run_consumes_bus_traffic_until_shutdown() {
        let (bus_sender, _) = broadcast::channel(64);
        let transport = RecordingTransport::default();
        let notifier_receiver = bus_sender.subscribe();
        let notifier_transport = Box::new(transport.clone());
        let handle = thread::spawn(move || {
            let mut notifier = PresenceNotifier::new(notifier_receiver, notifier_transport);
            notifier.run();
        });

        bus_sender
            .send(Message::Presence(PresenceMessage::UpdateActivity(update(
                "Playing One by A",
            ))))
            .expect("failed to send message to bus");
        bus_sender
            .send(Message::Player(PlayerMessage::Shutdown))
            .expect("failed to send message to bus");

        handle.join().expect("notifier thread panicked");

        let start = Instant::now();
        loop {
            let delivered = transport
                .delivered
                .lock()
                .expect("delivered lock poisoned")
                .len();
            if delivered == 1 {
                break;
            }
            if start.elapsed() > Duration::from_secs(1) {
                panic!("timed out waiting for delivery");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}
