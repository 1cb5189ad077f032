//! Core types for the Discord IPC presence protocol
//!
//! Only the subset a presence client writes (handshake and SET_ACTIVITY) and
//! the replies it may read back.

use serde::{Deserialize, Serialize};

/// Process ID type
pub type Pid = u32;

/// Command name for rich presence updates
pub const SET_ACTIVITY: &str = "SET_ACTIVITY";

/// Handshake protocol version understood by the Discord client
pub const RPC_VERSION: u32 = 1;

/// IPC message types (Discord RPC protocol)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum IpcOpcode {
    Handshake = 0,
    Frame = 1,
    Close = 2,
    Ping = 3,
    Pong = 4,
}

impl TryFrom<u32> for IpcOpcode {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Handshake),
            1 => Ok(Self::Frame),
            2 => Ok(Self::Close),
            3 => Ok(Self::Ping),
            4 => Ok(Self::Pong),
            _ => Err(()),
        }
    }
}

/// Connection state of a presence client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Handshake sent as the first frame of every connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    pub v: u32,
    pub client_id: String,
}

impl Handshake {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            v: RPC_VERSION,
            client_id: client_id.into(),
        }
    }
}

/// Activity timestamps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timestamps {
    pub start: i64,
}

/// Activity assets (images)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
}

/// Rich presence activity for a playing track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub details: String,
    pub state: String,
    pub timestamps: Timestamps,
    pub assets: Assets,
}

impl Activity {
    /// Build the activity shown while `title` by `artist` is playing.
    ///
    /// Assets are only filled in when a non-empty artwork URL is known.
    pub fn for_track(title: &str, artist: &str, artwork_url: Option<&str>, start: i64) -> Self {
        let assets = match artwork_url {
            Some(url) if !url.is_empty() => Assets {
                large_image: Some(url.to_string()),
                large_text: Some(title.to_string()),
            },
            _ => Assets::default(),
        };

        Self {
            details: title.to_string(),
            state: format!("by {}", artist),
            timestamps: Timestamps { start },
            assets,
        }
    }
}

/// SET_ACTIVITY command arguments
///
/// `activity` is always serialized; `null` clears the presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActivityArgs {
    pub pid: Pid,
    pub activity: Option<Activity>,
}

/// RPC command frame sent to the Discord client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcCommand<A> {
    pub cmd: String,
    pub args: A,
    pub nonce: String,
}

impl RpcCommand<SetActivityArgs> {
    /// SET_ACTIVITY for the current process with a fresh nonce
    pub fn set_activity(activity: Option<Activity>) -> Self {
        Self {
            cmd: SET_ACTIVITY.to_string(),
            args: SetActivityArgs {
                pid: std::process::id(),
                activity,
            },
            nonce: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// RPC reply from the Discord client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub cmd: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub evt: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
}

/// Payload of a Close frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosePayload {
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

/// "Now playing" snapshot pushed by the host application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default, rename = "artwork")]
    pub artwork_url: Option<String>,
    #[serde(default, rename = "isPlaying")]
    pub is_playing: bool,
}

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
