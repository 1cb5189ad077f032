//! Configuration for the presence client

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the first Discord IPC socket
pub const DEFAULT_SOCKET_NAME: &str = "discord-ipc-0";

#[cfg(target_os = "macos")]
const DEFAULT_SCAN_ROOT: &str = "/var/folders";

#[cfg(not(target_os = "macos"))]
const DEFAULT_SCAN_ROOT: &str = "/run/user";

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord application ID sent in the handshake
    pub client_id: String,
    /// File name of the IPC socket
    pub socket_name: String,
    /// Per-user temp dir override; when unset the environment decides
    pub temp_dir: Option<PathBuf>,
    /// Well-known directories tried after the per-user temp dir
    pub fallback_dirs: Vec<PathBuf>,
    /// Shared temp root searched last
    pub scan_root: Option<PathBuf>,
    /// How many directory levels below `scan_root` are descended into
    pub scan_depth: usize,
    /// Connect timeout per candidate in milliseconds
    pub connect_timeout_ms: u64,
    /// Bound on a single frame write in milliseconds
    pub write_timeout_ms: u64,
    /// Enable debug logging
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            socket_name: DEFAULT_SOCKET_NAME.to_string(),
            temp_dir: None,
            fallback_dirs: vec![PathBuf::from("/tmp"), PathBuf::from("/var/tmp")],
            scan_root: Some(PathBuf::from(DEFAULT_SCAN_ROOT)),
            scan_depth: 4,
            connect_timeout_ms: 1000,
            write_timeout_ms: 1000,
            debug: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(id) = env::var("RSPRESENCE_CLIENT_ID") {
            config.client_id = id;
        }

        if let Ok(name) = env::var("RSPRESENCE_SOCKET_NAME") {
            if !name.is_empty() {
                config.socket_name = name;
            }
        }

        if let Ok(dir) = env::var("RSPRESENCE_TEMP_DIR") {
            if !dir.is_empty() {
                config.temp_dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(root) = env::var("RSPRESENCE_SCAN_ROOT") {
            config.scan_root = if root.is_empty() {
                None
            } else {
                Some(PathBuf::from(root))
            };
        }

        if let Ok(depth) = env::var("RSPRESENCE_SCAN_DEPTH") {
            if let Ok(d) = depth.parse() {
                config.scan_depth = d;
            }
        }

        if let Ok(timeout) = env::var("RSPRESENCE_CONNECT_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                config.connect_timeout_ms = t;
            }
        }

        if let Ok(timeout) = env::var("RSPRESENCE_WRITE_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                config.write_timeout_ms = t;
            }
        }

        if env::var("RSPRESENCE_DEBUG").is_ok() {
            config.debug = true;
        }

        config
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
