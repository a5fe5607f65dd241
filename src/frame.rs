// Docker multiplexed log framing.
//
// Each frame is an 8-byte header followed by the payload:
// [stream kind, 0, 0, 0, payload length (big-endian u32)]

use bytes::{BufMut, Bytes, BytesMut};

pub const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
}

impl StreamKind {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(StreamKind::Stdin),
            1 => Some(StreamKind::Stdout),
            2 => Some(StreamKind::Stderr),
            _ => None,
        }
    }

    fn as_byte(self) -> u8 {
        match self {
            StreamKind::Stdin => 0,
            StreamKind::Stdout => 1,
            StreamKind::Stderr => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogFrame<'a> {
    /// None when the header carries an unknown stream byte.
    pub stream: Option<StreamKind>,
    pub payload: &'a [u8],
}

/// Strip the header from one read chunk. Everything after the first eight
/// bytes is payload; a chunk shorter than a header has no payload.
pub fn decode_frame(chunk: &[u8]) -> Option<LogFrame<'_>> {
    if chunk.len() < HEADER_LEN {
        return None;
    }
    Some(LogFrame {
        stream: StreamKind::from_byte(chunk[0]),
        payload: &chunk[HEADER_LEN..],
    })
}

pub fn encode_frame(stream: StreamKind, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    buf.put_u8(stream.as_byte());
    buf.put_bytes(0, 3);
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_strips_header() {
        let chunk = encode_frame(StreamKind::Stderr, b"2024-05-01T10:00:00Z oops\n");
        let frame = decode_frame(&chunk).unwrap();
        assert_eq!(frame.stream, Some(StreamKind::Stderr));
        assert_eq!(frame.payload, b"2024-05-01T10:00:00Z oops\n");
    }

    #[test]
    fn decode_short_chunk_has_no_payload() {
        assert!(decode_frame(&[]).is_none());
        assert!(decode_frame(&[1, 0, 0, 0, 0, 0, 0]).is_none());
    }

    #[test]
    fn decode_header_only_chunk_is_empty() {
        let frame = decode_frame(&[1, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn encode_writes_big_endian_length() {
        let chunk = encode_frame(StreamKind::Stdout, &[b'x'; 300]);
        assert_eq!(&chunk[..HEADER_LEN], &[1, 0, 0, 0, 0, 0, 1, 44]);
        assert_eq!(chunk.len(), HEADER_LEN + 300);
    }

    #[test]
    fn decode_unknown_stream_byte() {
        let frame = decode_frame(&[9, 0, 0, 0, 0, 0, 0, 1, b'a']).unwrap();
        assert_eq!(frame.stream, None);
        assert_eq!(frame.payload, b"a");
    }
}
