//! Discovery of the Discord IPC socket
//!
//! Unix: `$XDG_RUNTIME_DIR/discord-ipc-0` (or `$TMPDIR`, ...), then `/tmp` and
//! `/var/tmp`, then a shallow search of the shared temp root (`/var/folders`
//! on macOS, where sandboxed clients keep their per-user directories).

use crate::config::Config;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables naming the per-user temp dir, in priority order
const TEMP_DIR_VARS: [&str; 4] = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"];

/// Ordered list of socket paths to try
#[derive(Debug, Clone)]
pub struct EndpointLocator {
    socket_name: String,
    /// Fixed per-user temp dir; when unset the environment is read per call
    temp_dir: Option<PathBuf>,
    fallback_dirs: Vec<PathBuf>,
    scan_root: Option<PathBuf>,
    scan_depth: usize,
}

impl EndpointLocator {
    pub fn new(config: &Config) -> Self {
        Self {
            socket_name: config.socket_name.clone(),
            temp_dir: config.temp_dir.clone(),
            fallback_dirs: config.fallback_dirs.clone(),
            scan_root: config.scan_root.clone(),
            scan_depth: config.scan_depth,
        }
    }

    /// Candidate socket paths, highest priority first.
    ///
    /// Paths are not checked for existence except by the scan; the caller
    /// decides by connecting.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(dir) = self.temp_dir.clone().or_else(user_temp_dir) {
            paths.push(dir.join(&self.socket_name));
        }

        for dir in &self.fallback_dirs {
            paths.push(dir.join(&self.socket_name));
        }

        if let Some(root) = &self.scan_root {
            if let Some(found) = scan_for_socket(root, &self.socket_name, self.scan_depth) {
                debug!("Found IPC socket candidate by scan: {:?}", found);
                paths.push(found);
            }
        }

        let mut unique = Vec::with_capacity(paths.len());
        for path in paths {
            if !unique.contains(&path) {
                unique.push(path);
            }
        }
        unique
    }
}

fn user_temp_dir() -> Option<PathBuf> {
    TEMP_DIR_VARS
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Breadth-first search below `root` for an entry whose name ends with
/// `suffix`.
///
/// Directories deeper than `max_depth` levels below `root` are not opened.
/// Symlinks are never followed and unreadable directories are skipped.
pub fn scan_for_socket(root: &Path, suffix: &str, max_depth: usize) -> Option<PathBuf> {
    let mut queue = VecDeque::new();
    queue.push_back((root.to_path_buf(), 0usize));

    while let Some((dir, depth)) = queue.pop_front() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        let mut names: Vec<_> = entries.filter_map(Result::ok).collect();
        names.sort_by_key(|entry| entry.file_name());

        for entry in names {
            if ends_with(&entry.file_name(), suffix) {
                return Some(entry.path());
            }

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir && depth < max_depth {
                queue.push_back((entry.path(), depth + 1));
            }
        }
    }

    None
}

fn ends_with(name: &OsStr, suffix: &str) -> bool {
    name.to_str().is_some_and(|name| name.ends_with(suffix))
}
