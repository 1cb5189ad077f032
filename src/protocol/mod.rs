//! Wire format of the Discord IPC socket
//!
//! Every message is an 8-byte little-endian header (`opcode`, `length`)
//! followed by `length` bytes of compact JSON.

pub mod frame;

pub use frame::{decode_header, encode, encode_message, read_frame, Frame};

use thiserror::Error;

/// Size of the frame header in bytes
pub const HEADER_LEN: usize = 8;

/// Largest frame body accepted from the peer
pub const MAX_FRAME_LEN: u32 = 64 * 1024;

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame of {length} bytes exceeds limit of {max}")]
    FrameTooLarge { length: u32, max: u32 },
}
