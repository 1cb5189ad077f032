//! rspresence - reference host
//!
//! Reads one JSON track snapshot per line from stdin, e.g.
//! `{"title":"Song","artist":"Band","artwork":"https://...","isPlaying":true}`,
//! and mirrors it to Discord rich presence.

use rspresence::{Config, PresenceBridge, PresenceHandle, TrackEventSource, TrackSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn setup_logging(debug: bool) {
    let filter = if debug {
        "rspresence=debug,info"
    } else {
        "rspresence=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Feed stdin snapshots to the track source until EOF
async fn read_snapshots(source: TrackEventSource) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<TrackSnapshot>(line) {
            Ok(snapshot) => source.emit(&snapshot),
            Err(e) => warn!("Ignoring malformed track snapshot: {}", e),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env();
    setup_logging(config.debug);

    if config.client_id.is_empty() {
        error!("RSPRESENCE_CLIENT_ID is not set");
        return Err("missing Discord client id".into());
    }

    info!("rspresence v{} starting", env!("CARGO_PKG_VERSION"));

    let (presence, task) = PresenceHandle::spawn(config);

    let mut source = TrackEventSource::new();
    PresenceBridge::new(presence.clone()).attach(&mut source);

    tokio::select! {
        result = read_snapshots(source) => {
            if let Err(e) = result {
                warn!("stdin error: {}", e);
            }
            info!("Input closed");
        }
        _ = shutdown_signal() => {}
    }

    presence.clear_presence();
    presence.shutdown().await;
    let _ = task.await;

    info!("Shutdown complete");
    Ok(())
}
