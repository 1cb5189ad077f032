//! Errors raised inside the presence client
//!
//! None of these reach the host: the connection logs them and carries on.

use crate::protocol::CodecError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("no IPC endpoint available")]
    NoEndpoint,
    #[error("timed out connecting to {path:?}")]
    Timeout { path: PathBuf },
    #[error("timed out writing to the IPC socket")]
    WriteTimeout,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}
