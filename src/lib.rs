//! Client-side playback queue engine for a media-streaming application.
//!
//! The engine owns "what song is playing": the ordered play queue, the
//! current-song selection, shuffle/loop semantics, forward/backward
//! navigation, and the one-way "now playing" activity feed consumed by the
//! presence/chat service. It has no opinion about audio transport or
//! rendering; the host binds a media element to the committed state and a
//! socket to the presence traffic.
//!
//! Components communicate over a `tokio` broadcast bus. A host session
//! constructs an [`EngineRuntime`], sends [`protocol::PlayerMessage`]
//! commands through its handle, and observes committed state via
//! [`protocol::PlayerMessage::PlaybackChanged`] snapshots on a bus
//! subscription.

pub mod config;
pub mod navigation;
pub mod player_manager;
pub mod presence;
pub mod protocol;
pub mod queue;
pub mod runtime;
pub mod shuffle;
pub mod song;

pub use config::{EngineConfig, ShuffleConfig};
pub use player_manager::PlayerManager;
pub use presence::{ActivityTransport, PresenceNotifier};
pub use runtime::EngineRuntime;
pub use shuffle::ShuffleRestore;
pub use song::Song;
