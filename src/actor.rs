//! Task owning a [`PresenceConnection`]
//!
//! Hosts hold a cloneable [`PresenceHandle`]; every call becomes a command on
//! a bounded channel, handled one at a time and in order by the task.

use crate::config::Config;
use crate::connection::PresenceConnection;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const COMMAND_CAPACITY: usize = 64;

/// Commands from handles to the presence task
#[derive(Debug)]
pub enum PresenceCommand {
    Update {
        title: String,
        artist: String,
        artwork_url: Option<String>,
    },
    Clear,
    Disconnect,
    /// Disconnect and stop the task
    Shutdown(oneshot::Sender<()>),
}

/// Non-blocking handle to the presence task
#[derive(Debug, Clone)]
pub struct PresenceHandle {
    tx: mpsc::Sender<PresenceCommand>,
}

impl PresenceHandle {
    /// Spawn the presence task on the current runtime
    pub fn spawn(config: Config) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let task = tokio::spawn(run(PresenceConnection::new(config), rx));
        (Self { tx }, task)
    }

    pub fn update_presence(&self, title: &str, artist: &str, artwork_url: Option<&str>) {
        self.submit(PresenceCommand::Update {
            title: title.to_string(),
            artist: artist.to_string(),
            artwork_url: artwork_url.map(str::to_string),
        });
    }

    pub fn clear_presence(&self) {
        self.submit(PresenceCommand::Clear);
    }

    pub fn disconnect(&self) {
        self.submit(PresenceCommand::Disconnect);
    }

    /// Disconnect and wait for the task to finish processing queued commands
    pub async fn shutdown(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(PresenceCommand::Shutdown(done_tx)).await.is_ok() {
            let _ = done_rx.await;
        }
    }

    fn submit(&self, command: PresenceCommand) {
        if let Err(e) = self.tx.try_send(command) {
            warn!("Dropping presence command: {}", e);
        }
    }
}

async fn run(mut conn: PresenceConnection, mut rx: mpsc::Receiver<PresenceCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            PresenceCommand::Update {
                title,
                artist,
                artwork_url,
            } => {
                conn.update_presence(&title, &artist, artwork_url.as_deref())
                    .await;
            }
            PresenceCommand::Clear => conn.clear_presence().await,
            PresenceCommand::Disconnect => conn.disconnect(),
            PresenceCommand::Shutdown(done) => {
                conn.disconnect();
                let _ = done.send(());
                debug!("Presence task stopped");
                return;
            }
        }
    }

    conn.disconnect();
    debug!("Presence task stopped: all handles dropped");
}
