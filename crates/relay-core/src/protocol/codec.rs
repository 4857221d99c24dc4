//! Frame codec for the session stream.
//!
//! Wire format:
//! ```text
//! [payload_len:4][payload:N]
//! ```
//! `payload_len` is a big-endian `u32`; the payload is one UTF-8 JSON
//! [`RelayMessage`] object.  Frames larger than [`MAX_PAYLOAD_LEN`] are a
//! fatal framing error because the stream cannot be resynchronised after
//! skipping an untrusted length.
//!
//! Decoding is split in two so the session loop can treat the failures
//! differently: [`read_frame`] fails only on framing/I/O problems (close the
//! connection), while [`decode_payload`] fails on bad JSON (drop the record,
//! keep the connection).

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use thiserror::Error;

use crate::protocol::messages::RelayMessage;

/// Size of the big-endian length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest payload accepted on the session stream.
pub const MAX_PAYLOAD_LEN: usize = 4096;

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The declared payload length exceeds [`MAX_PAYLOAD_LEN`].
    #[error("frame too large: declared {declared} bytes, limit is {limit}")]
    FrameTooLarge { declared: usize, limit: usize },

    /// The stream ended in the middle of a frame.
    #[error("stream ended mid-frame: expected {expected} bytes, got {received}")]
    TruncatedFrame { expected: usize, received: usize },

    /// The payload is not a valid JSON command record.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The underlying stream failed.
    #[error("stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encodes a [`RelayMessage`] into a length-prefixed frame.
///
/// # Errors
///
/// Returns [`ProtocolError::FrameTooLarge`] if the JSON encoding exceeds
/// [`MAX_PAYLOAD_LEN`], or [`ProtocolError::MalformedPayload`] if JSON
/// serialization fails.
///
/// # Examples
///
/// ```rust
/// use relay_core::protocol::codec::{encode_frame, decode_payload, LENGTH_PREFIX_SIZE};
/// use relay_core::RelayMessage;
///
/// let msg = RelayMessage::new("gesture", "tap");
/// let frame = encode_frame(&msg).unwrap();
/// assert_eq!(decode_payload(&frame[LENGTH_PREFIX_SIZE..]).unwrap(), msg);
/// ```
pub fn encode_frame(msg: &RelayMessage) -> Result<Vec<u8>, ProtocolError> {
    let payload =
        serde_json::to_vec(msg).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))?;
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLarge {
            declared: payload.len(),
            limit: MAX_PAYLOAD_LEN,
        });
    }

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decodes one JSON payload (without its length prefix) into a [`RelayMessage`].
///
/// Only the shape is validated here: both fields must be present and be
/// strings.  Whether the values are in the vocabulary is decided later by
/// [`RelayMessage::command`].
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] for invalid UTF-8, invalid
/// JSON, or a missing/mistyped field.
pub fn decode_payload(payload: &[u8]) -> Result<RelayMessage, ProtocolError> {
    serde_json::from_slice(payload).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

/// Reads one frame payload from `reader`.
///
/// Returns `Ok(None)` when the stream ends cleanly on a frame boundary.
///
/// # Errors
///
/// - [`ProtocolError::TruncatedFrame`] if the stream ends mid-frame.
/// - [`ProtocolError::FrameTooLarge`] if the declared length exceeds the limit.
/// - [`ProtocolError::Io`] for any other read failure.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; LENGTH_PREFIX_SIZE];
    let mut filled = 0;
    while filled < LENGTH_PREFIX_SIZE {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(ProtocolError::TruncatedFrame {
                expected: LENGTH_PREFIX_SIZE,
                received: filled,
            });
        }
        filled += n;
    }

    let declared = u32::from_be_bytes(header) as usize;
    if declared > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::FrameTooLarge {
            declared,
            limit: MAX_PAYLOAD_LEN,
        });
    }

    let mut payload = vec![0u8; declared];
    let mut received = 0;
    while received < declared {
        let n = reader.read(&mut payload[received..]).await?;
        if n == 0 {
            return Err(ProtocolError::TruncatedFrame {
                expected: declared,
                received,
            });
        }
        received += n;
    }
    Ok(Some(payload))
}

/// Encodes `msg` and writes the complete frame to `writer`.
///
/// # Errors
///
/// Returns any encoding error from [`encode_frame`] or a write failure.
pub async fn write_frame<W>(writer: &mut W, msg: &RelayMessage) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(msg)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn frame_bytes(json: &str) -> Vec<u8> {
        let mut buf = (json.len() as u32).to_be_bytes().to_vec();
        buf.extend_from_slice(json.as_bytes());
        buf
    }

    #[test]
    fn test_encode_frame_prefixes_big_endian_length() {
        // Arrange
        let msg = RelayMessage::new("gesture", "tap");

        // Act
        let frame = encode_frame(&msg).unwrap();

        // Assert
        let json = br#"{"type":"gesture","action":"tap"}"#;
        assert_eq!(&frame[..4], &(json.len() as u32).to_be_bytes());
        assert_eq!(&frame[4..], json);
    }

    #[test]
    fn test_encode_frame_rejects_oversized_payload() {
        let msg = RelayMessage::new("gesture", "x".repeat(MAX_PAYLOAD_LEN));
        let result = encode_frame(&msg);
        assert!(matches!(result, Err(ProtocolError::FrameTooLarge { .. })));
    }

    #[test]
    fn test_decode_payload_ignores_unknown_fields() {
        // Arrange – a newer companion may attach extra metadata
        let json = br#"{"type":"anki_action","action":"anki_2","sent_at":1700000000}"#;

        // Act
        let msg = decode_payload(json).unwrap();

        // Assert
        assert_eq!(msg, RelayMessage::new("anki_action", "anki_2"));
    }

    #[test]
    fn test_decode_payload_rejects_missing_action() {
        let result = decode_payload(br#"{"type":"gesture"}"#);
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_payload_rejects_non_string_action() {
        let result = decode_payload(br#"{"type":"gesture","action":3}"#);
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_payload_rejects_invalid_json() {
        let result = decode_payload(b"scroll_down");
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_read_frame_returns_none_on_clean_eof() {
        // Arrange
        let mut stream = Builder::new().build();

        // Act
        let frame = read_frame(&mut stream).await.unwrap();

        // Assert
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_read_frame_reassembles_split_reads() {
        // Arrange – header and payload arrive in awkward fragments
        let bytes = frame_bytes(r#"{"type":"gesture","action":"back"}"#);
        let mut stream = Builder::new()
            .read(&bytes[..2])
            .read(&bytes[2..7])
            .read(&bytes[7..])
            .build();

        // Act
        let payload = read_frame(&mut stream).await.unwrap().unwrap();

        // Assert
        assert_eq!(
            decode_payload(&payload).unwrap(),
            RelayMessage::new("gesture", "back")
        );
    }

    #[tokio::test]
    async fn test_read_frame_reads_consecutive_frames_in_order() {
        let mut bytes = frame_bytes(r#"{"type":"anki_action","action":"anki_1"}"#);
        bytes.extend(frame_bytes(r#"{"type":"anki_action","action":"anki_4"}"#));
        let mut stream = Builder::new().read(&bytes).build();

        let first = read_frame(&mut stream).await.unwrap().unwrap();
        let second = read_frame(&mut stream).await.unwrap().unwrap();
        let end = read_frame(&mut stream).await.unwrap();

        assert_eq!(decode_payload(&first).unwrap().action, "anki_1");
        assert_eq!(decode_payload(&second).unwrap().action, "anki_4");
        assert!(end.is_none());
    }

    #[tokio::test]
    async fn test_read_frame_reports_truncated_header() {
        let mut stream = Builder::new().read(&[0x00, 0x00]).build();
        let result = read_frame(&mut stream).await;
        assert!(matches!(
            result,
            Err(ProtocolError::TruncatedFrame { expected: 4, received: 2 })
        ));
    }

    #[tokio::test]
    async fn test_read_frame_reports_truncated_payload() {
        let bytes = frame_bytes(r#"{"type":"gesture","action":"tap"}"#);
        let mut stream = Builder::new().read(&bytes[..10]).build();
        let result = read_frame(&mut stream).await;
        assert!(matches!(result, Err(ProtocolError::TruncatedFrame { .. })));
    }

    #[tokio::test]
    async fn test_read_frame_rejects_declared_length_over_limit() {
        // Arrange – only the header is sent; the limit check must not wait for the body
        let header = ((MAX_PAYLOAD_LEN + 1) as u32).to_be_bytes();
        let mut stream = Builder::new().read(&header).build();

        // Act
        let result = read_frame(&mut stream).await;

        // Assert
        assert!(matches!(
            result,
            Err(ProtocolError::FrameTooLarge { limit: MAX_PAYLOAD_LEN, .. })
        ));
    }

    #[tokio::test]
    async fn test_read_frame_accepts_empty_payload() {
        let mut stream = Builder::new().read(&[0, 0, 0, 0]).build();
        let payload = read_frame(&mut stream).await.unwrap().unwrap();
        assert!(payload.is_empty());
    }

    #[tokio::test]
    async fn test_write_frame_emits_encoded_bytes() {
        // Arrange
        let msg = RelayMessage::new("gesture", "refresh");
        let expected = encode_frame(&msg).unwrap();
        let mut sink = Builder::new().write(&expected).build();

        // Act / Assert – the mock panics if the written bytes differ
        write_frame(&mut sink, &msg).await.unwrap();
    }
}
