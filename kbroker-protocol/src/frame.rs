//! Length-prefixed framing.
//!
//! Frame layout:
//!
//! ```text
//! +--------------+---------------------------+
//! | message_size | header + body             |
//! | int32        | message_size bytes        |
//! +--------------+---------------------------+
//! ```
//!
//! `message_size` excludes itself. On encode it is unknown until the header
//! and body are written, so a placeholder is reserved and patched afterwards.

use crate::error::ProtocolError;
use crate::MAX_FRAME_SIZE;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the length prefix in bytes.
pub const SIZE_PREFIX_LEN: usize = 4;

/// A complete inbound frame with its size prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub payload: Bytes,
}

impl Frame {
    /// Splits the next frame off the front of `buf`.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was buffered,
    /// `Ok(None)` if more data is needed, or `Err` on a bad size prefix.
    pub fn decode(buf: &mut BytesMut, max_size: usize) -> Result<Option<Self>, ProtocolError> {
        if buf.len() < SIZE_PREFIX_LEN {
            return Ok(None);
        }

        let size = read_size(&buf[..SIZE_PREFIX_LEN], max_size)?;
        if buf.len() < SIZE_PREFIX_LEN + size {
            return Ok(None);
        }

        buf.advance(SIZE_PREFIX_LEN);
        let payload = buf.split_to(size).freeze();
        Ok(Some(Self { payload }))
    }

    /// Validates the size prefix of exactly one frame and returns its payload.
    pub fn payload_of(frame: &[u8]) -> Result<Bytes, ProtocolError> {
        if frame.len() < SIZE_PREFIX_LEN {
            return Err(ProtocolError::Truncated {
                needed: SIZE_PREFIX_LEN,
                remaining: frame.len(),
            });
        }
        let size = read_size(&frame[..SIZE_PREFIX_LEN], MAX_FRAME_SIZE)?;
        let body = &frame[SIZE_PREFIX_LEN..];
        if body.len() < size {
            return Err(ProtocolError::Truncated {
                needed: size,
                remaining: body.len(),
            });
        }
        Ok(Bytes::copy_from_slice(&body[..size]))
    }

    /// Builds an outbound frame: reserves the size prefix, lets `write` fill
    /// in header and body, then patches the prefix with the final length.
    pub fn encode_with<F>(write: F) -> Result<BytesMut, ProtocolError>
    where
        F: FnOnce(&mut BytesMut),
    {
        let mut buf = BytesMut::with_capacity(64);
        buf.put_i32(0);
        write(&mut buf);

        let size = buf.len() - SIZE_PREFIX_LEN;
        if size > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size,
                max: MAX_FRAME_SIZE,
            });
        }
        buf[..SIZE_PREFIX_LEN].copy_from_slice(&(size as i32).to_be_bytes());
        Ok(buf)
    }
}

fn read_size(prefix: &[u8], max_size: usize) -> Result<usize, ProtocolError> {
    let size = i32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    if size < 0 {
        return Err(ProtocolError::InvalidEncoding(format!(
            "negative message size {size}"
        )));
    }
    let size = size as usize;
    if size > max_size {
        return Err(ProtocolError::FrameTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(payload: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_i32(payload.len() as i32);
        buf.put_slice(payload);
        buf
    }

    #[test]
    fn test_decode_complete_frame() {
        let mut buf = framed(b"hello");
        let frame = Frame::decode(&mut buf, MAX_FRAME_SIZE).unwrap().unwrap();
        assert_eq!(&frame.payload[..], b"hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_needs_more_data() {
        let mut buf = BytesMut::from(&[0x00u8, 0x00][..]);
        assert!(Frame::decode(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());

        let mut buf = framed(b"hello");
        buf.truncate(7);
        assert!(Frame::decode(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
        // Nothing consumed while waiting.
        assert_eq!(buf.len(), 7);
    }

    #[test]
    fn test_decode_multiple_frames_in_buffer() {
        let mut buf = framed(b"one");
        buf.extend_from_slice(&framed(b"two"));

        let first = Frame::decode(&mut buf, MAX_FRAME_SIZE).unwrap().unwrap();
        let second = Frame::decode(&mut buf, MAX_FRAME_SIZE).unwrap().unwrap();
        assert_eq!(&first.payload[..], b"one");
        assert_eq!(&second.payload[..], b"two");
        assert!(Frame::decode(&mut buf, MAX_FRAME_SIZE).unwrap().is_none());
    }

    #[test]
    fn test_decode_negative_size() {
        let mut buf = BytesMut::from(&[0xffu8, 0xff, 0xff, 0xff][..]);
        assert!(matches!(
            Frame::decode(&mut buf, MAX_FRAME_SIZE),
            Err(ProtocolError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_decode_oversized() {
        let mut buf = framed(&[0u8; 32]);
        assert!(matches!(
            Frame::decode(&mut buf, 16),
            Err(ProtocolError::FrameTooLarge { size: 32, max: 16 })
        ));
    }

    #[test]
    fn test_payload_of_truncated() {
        let mut buf = framed(b"hello");
        buf.truncate(6);
        assert!(matches!(
            Frame::payload_of(&buf),
            Err(ProtocolError::Truncated {
                needed: 5,
                remaining: 2
            })
        ));
    }

    #[test]
    fn test_encode_patches_size() {
        let buf = Frame::encode_with(|buf| buf.put_slice(b"abcdef")).unwrap();
        assert_eq!(&buf[..4], &[0, 0, 0, 6]);
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_encode_empty() {
        let buf = Frame::encode_with(|_| {}).unwrap();
        assert_eq!(&buf[..], &[0, 0, 0, 0]);
    }
}
