//! rspresence - Discord rich presence over the local IPC socket
//!
//! Finds the Discord client's Unix socket, handshakes, and streams
//! SET_ACTIVITY frames describing the track the host is playing. Presence is
//! best-effort: every failure is logged and absorbed.

pub mod actor;
pub mod bridge;
pub mod config;
pub mod connection;
pub mod error;
pub mod locator;
pub mod protocol;
pub mod types;

pub use actor::PresenceHandle;
pub use bridge::{PresenceBridge, TrackEventSource};
pub use config::Config;
pub use connection::PresenceConnection;
pub use error::PresenceError;
pub use types::*;
