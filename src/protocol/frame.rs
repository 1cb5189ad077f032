//! Frame encoding and decoding

use super::{CodecError, HEADER_LEN, MAX_FRAME_LEN};
use crate::types::IpcOpcode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opcode: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Known opcode, if any
    pub fn kind(&self) -> Option<IpcOpcode> {
        IpcOpcode::try_from(self.opcode).ok()
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Encode IPC message with header
pub fn encode_message(opcode: u32, data: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(HEADER_LEN + data.len());
    buffer.extend_from_slice(&opcode.to_le_bytes());
    buffer.extend_from_slice(&(data.len() as u32).to_le_bytes());
    buffer.extend_from_slice(data);
    buffer
}

/// Serialize `payload` as compact JSON and frame it
pub fn encode<T: Serialize + ?Sized>(opcode: IpcOpcode, payload: &T) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(payload)?;
    Ok(encode_message(opcode as u32, &json))
}

/// Split a header into `(opcode, length)`
pub fn decode_header(header: [u8; HEADER_LEN]) -> (u32, u32) {
    let opcode = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let length = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    (opcode, length)
}

/// Read exactly one frame.
///
/// A stream that ends before `length` body bytes arrive is an error.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, CodecError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).await?;

    let (opcode, length) = decode_header(header);
    if length > MAX_FRAME_LEN {
        return Err(CodecError::FrameTooLarge {
            length,
            max: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0u8; length as usize];
    reader.read_exact(&mut payload).await?;

    Ok(Frame { opcode, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Handshake;

    #[test]
    fn test_header_layout() {
        let bytes = encode(IpcOpcode::Frame, &serde_json::json!({})).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 2, 0, 0, 0, b'{', b'}']);
    }

    #[test]
    fn test_header_matches_payload() {
        let payload = serde_json::json!({ "details": "Schön", "n": [1, 2, 3] });
        let bytes = encode(IpcOpcode::Frame, &payload).unwrap();

        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&bytes[..HEADER_LEN]);
        let (opcode, length) = decode_header(header);

        assert_eq!(opcode, 1);
        assert_eq!(length as usize, serde_json::to_vec(&payload).unwrap().len());
        assert_eq!(length as usize, bytes.len() - HEADER_LEN);
    }

    #[tokio::test]
    async fn test_read_frame() {
        let bytes = encode(IpcOpcode::Handshake, &Handshake::new("123")).unwrap();
        let mut reader = bytes.as_slice();

        let frame = read_frame(&mut reader).await.unwrap();
        assert_eq!(frame.kind(), Some(IpcOpcode::Handshake));

        let handshake: Handshake = frame.json().unwrap();
        assert_eq!(handshake.v, 1);
        assert_eq!(handshake.client_id, "123");
    }

    #[tokio::test]
    async fn test_short_body_is_an_error() {
        let mut bytes = encode_message(1, b"{\"cmd\":\"x\"}");
        bytes.truncate(bytes.len() - 3);
        let mut reader = bytes.as_slice();

        assert!(matches!(
            read_frame(&mut reader).await,
            Err(CodecError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_length_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&(MAX_FRAME_LEN + 1).to_le_bytes());
        let mut reader = bytes.as_slice();

        assert!(matches!(
            read_frame(&mut reader).await,
            Err(CodecError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_malformed_body() {
        let frame = Frame {
            opcode: 1,
            payload: b"{not json".to_vec(),
        };
        assert!(frame.json::<serde_json::Value>().is_err());
    }
}
