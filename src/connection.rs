//! Presence connection to the local Discord client
//!
//! Owns the IPC socket and the connected/disconnected state. Every operation
//! takes `&mut self`, so one owner (see [`crate::actor`]) serializes them.
//! Failures never reach the caller: presence is best-effort.

use crate::config::Config;
use crate::error::PresenceError;
use crate::locator::EndpointLocator;
use crate::protocol;
use crate::types::{
    now_millis, Activity, ClosePayload, ConnectionState, Handshake, IpcOpcode, RpcCommand,
    RpcResponse, SetActivityArgs,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Rich presence connection
pub struct PresenceConnection {
    config: Config,
    locator: EndpointLocator,
    state: ConnectionState,
    /// Write half of the live socket
    writer: Option<OwnedWriteHalf>,
    /// Task draining the handshake acknowledgment; owns the read half
    reader: Option<JoinHandle<()>>,
    endpoint: Option<PathBuf>,
    /// Title, artist and start time of the track being shown
    playing: Option<(String, String, i64)>,
}

impl PresenceConnection {
    pub fn new(config: Config) -> Self {
        let locator = EndpointLocator::new(&config);
        Self {
            config,
            locator,
            state: ConnectionState::Disconnected,
            writer: None,
            reader: None,
            endpoint: None,
            playing: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Socket path of the live connection
    pub fn endpoint(&self) -> Option<&Path> {
        self.endpoint.as_deref()
    }

    /// Connect and handshake unless already connected.
    ///
    /// Tries each candidate path in order; staying disconnected is not an
    /// error.
    pub async fn connect(&mut self) -> ConnectionState {
        if self.state == ConnectionState::Connected {
            return self.state;
        }

        match self.try_connect().await {
            Ok(path) => info!("Connected to Discord IPC at {:?}", path),
            Err(e) => debug!("Discord IPC unavailable: {}", e),
        }

        self.state
    }

    async fn try_connect(&mut self) -> Result<PathBuf, PresenceError> {
        let locator = self.locator.clone();
        let candidates = tokio::task::spawn_blocking(move || locator.candidates())
            .await
            .unwrap_or_default();

        let handshake = protocol::encode(
            IpcOpcode::Handshake,
            &Handshake::new(self.config.client_id.as_str()),
        )?;

        for path in candidates {
            let stream = match self.open(&path, &handshake).await {
                Ok(stream) => stream,
                Err(e) => {
                    debug!("IPC candidate {:?} failed: {}", path, e);
                    continue;
                }
            };

            let (read_half, write_half) = stream.into_split();
            self.writer = Some(write_half);
            self.reader = Some(tokio::spawn(read_acknowledgment(read_half)));
            self.endpoint = Some(path.clone());
            self.state = ConnectionState::Connected;
            return Ok(path);
        }

        Err(PresenceError::NoEndpoint)
    }

    /// Connect to one candidate and write the handshake
    async fn open(&self, path: &Path, handshake: &[u8]) -> Result<UnixStream, PresenceError> {
        let mut stream = tokio::time::timeout(self.config.connect_timeout(), UnixStream::connect(path))
            .await
            .map_err(|_| PresenceError::Timeout {
                path: path.to_path_buf(),
            })??;

        write_frame(&mut stream, handshake, self.config.write_timeout()).await?;
        Ok(stream)
    }

    /// Show `title` by `artist` as the current activity.
    ///
    /// Connects first if needed; the update is dropped when no endpoint is
    /// reachable.
    pub async fn update_presence(&mut self, title: &str, artist: &str, artwork_url: Option<&str>) {
        if self.state == ConnectionState::Disconnected {
            self.connect().await;
        }
        if self.state == ConnectionState::Disconnected {
            return;
        }

        let start = self.track_start(title, artist);
        let activity = Activity::for_track(title, artist, artwork_url, start);
        self.send(&RpcCommand::set_activity(Some(activity))).await;
    }

    /// Start time of `title` by `artist`, kept across repeated updates of the
    /// same track
    fn track_start(&mut self, title: &str, artist: &str) -> i64 {
        match &self.playing {
            Some((t, a, start)) if t == title && a == artist => *start,
            _ => {
                let start = now_millis();
                self.playing = Some((title.to_string(), artist.to_string(), start));
                start
            }
        }
    }

    /// Clear the activity. Never connects.
    pub async fn clear_presence(&mut self) {
        self.playing = None;
        if self.state == ConnectionState::Disconnected {
            return;
        }

        self.send(&RpcCommand::set_activity(None)).await;
    }

    /// Close the socket. Safe to call repeatedly.
    pub fn disconnect(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        if self.writer.take().is_some() {
            debug!("Closed Discord IPC connection to {:?}", self.endpoint);
        }
        self.endpoint = None;
        self.state = ConnectionState::Disconnected;
    }

    async fn send(&mut self, command: &RpcCommand<SetActivityArgs>) {
        let data = match protocol::encode(IpcOpcode::Frame, command) {
            Ok(data) => data,
            Err(e) => {
                warn!("Failed to encode {}: {}", command.cmd, e);
                return;
            }
        };

        let Some(writer) = self.writer.as_mut() else {
            return;
        };

        // A dead or stalled peer must not keep us "connected"; the next update re-handshakes.
        let result = write_frame(writer, &data, self.config.write_timeout()).await;
        if let Err(e) = result {
            warn!("Discord IPC write failed: {}", e);
            self.disconnect();
        }
    }
}

/// Write one frame, giving up after `limit`
async fn write_frame<W>(writer: &mut W, data: &[u8], limit: Duration) -> Result<(), PresenceError>
where
    W: AsyncWrite + Unpin,
{
    tokio::time::timeout(limit, writer.write_all(data))
        .await
        .map_err(|_| PresenceError::WriteTimeout)??;
    Ok(())
}

impl Drop for PresenceConnection {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Read and log the peer's reply to the handshake.
///
/// Only reads; the connection state is never touched from here.
async fn read_acknowledgment(mut reader: OwnedReadHalf) {
    let frame = match protocol::read_frame(&mut reader).await {
        Ok(frame) => frame,
        Err(e) => {
            debug!("No handshake acknowledgment: {}", e);
            return;
        }
    };

    match frame.kind() {
        Some(IpcOpcode::Frame) => match frame.json::<RpcResponse>() {
            Ok(response) if response.evt.as_deref() == Some("READY") => {
                let user = response
                    .data
                    .as_ref()
                    .and_then(|data| data.get("user"))
                    .and_then(|user| user.get("username"))
                    .and_then(|name| name.as_str())
                    .unwrap_or("unknown");
                info!("Discord IPC ready (user: {})", user);
            }
            Ok(response) => debug!("Discord IPC reply: {}", response.cmd),
            Err(e) => debug!("Malformed handshake acknowledgment: {}", e),
        },
        Some(IpcOpcode::Close) => match frame.json::<ClosePayload>() {
            Ok(close) => warn!(
                "Discord closed the IPC connection: {} (code {})",
                close.message, close.code
            ),
            Err(e) => debug!("Malformed close frame: {}", e),
        },
        _ => debug!("Ignoring IPC frame with opcode {}", frame.opcode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated_config(dir: &Path) -> Config {
        Config {
            client_id: "123".to_string(),
            temp_dir: Some(dir.to_path_buf()),
            fallback_dirs: Vec::new(),
            scan_root: None,
            connect_timeout_ms: 200,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_starts_disconnected() {
        let temp = TempDir::new().unwrap();
        let conn = PresenceConnection::new(isolated_config(temp.path()));

        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(conn.endpoint().is_none());
    }

    #[tokio::test]
    async fn test_no_endpoint_stays_disconnected() {
        let temp = TempDir::new().unwrap();
        let mut conn = PresenceConnection::new(isolated_config(temp.path()));

        assert_eq!(conn.connect().await, ConnectionState::Disconnected);
        conn.update_presence("Song", "Band", None).await;
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_stale_socket_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("discord-ipc-0"), b"").unwrap();
        let mut conn = PresenceConnection::new(isolated_config(temp.path()));

        assert_eq!(conn.connect().await, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut conn = PresenceConnection::new(isolated_config(temp.path()));

        conn.disconnect();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        conn.disconnect();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_clear_when_disconnected_is_noop() {
        let temp = TempDir::new().unwrap();
        let mut conn = PresenceConnection::new(isolated_config(temp.path()));

        conn.clear_presence().await;
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }
}
