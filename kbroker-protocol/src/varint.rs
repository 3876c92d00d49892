//! Unsigned variable-length integers.
//!
//! Each byte carries seven data bits, least-significant group first. The high
//! bit is set on every byte except the last.

use crate::error::ProtocolError;
use bytes::{Buf, BufMut};

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Reads an unsigned varint.
pub fn get_uvarint<B: Buf>(buf: &mut B) -> Result<u64, ProtocolError> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(ProtocolError::Truncated {
                needed: 1,
                remaining: 0,
            });
        }
        let byte = buf.get_u8();
        // The tenth group only has room for bit 63.
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            return Err(ProtocolError::invalid("varint overflows 64 bits"));
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ProtocolError::invalid("varint longer than 10 bytes"))
}

/// Writes an unsigned varint.
pub fn put_uvarint<B: BufMut>(buf: &mut B, mut value: u64) {
    while value >= 0x80 {
        buf.put_u8((value as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Returns the number of bytes `value` occupies when encoded.
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Reads a varint that is used as a length or count on this platform.
pub(crate) fn get_uvarint_usize<B: Buf>(buf: &mut B) -> Result<usize, ProtocolError> {
    let value = get_uvarint(buf)?;
    usize::try_from(value).map_err(|_| ProtocolError::invalid("length exceeds address space"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use proptest::prelude::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = BytesMut::new();
        put_uvarint(&mut buf, value);
        buf.to_vec()
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7f]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xac, 0x02]);
        assert_eq!(encode(16383), vec![0xff, 0x7f]);
        assert_eq!(encode(16384), vec![0x80, 0x80, 0x01]);
        assert_eq!(
            encode(u64::MAX),
            vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn test_decode_stops_at_terminator() {
        let mut input: &[u8] = &[0xac, 0x02, 0x7f];
        assert_eq!(get_uvarint(&mut input).unwrap(), 300);
        assert_eq!(input, &[0x7f]);
    }

    #[test]
    fn test_decode_empty_is_truncated() {
        let mut input: &[u8] = &[];
        assert!(matches!(
            get_uvarint(&mut input),
            Err(ProtocolError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_missing_terminator_is_truncated() {
        let mut input: &[u8] = &[0x80, 0x80];
        assert!(matches!(
            get_uvarint(&mut input),
            Err(ProtocolError::Truncated { .. })
        ));
    }

    #[test]
    fn test_decode_eleven_groups_is_invalid() {
        let mut input: &[u8] = &[0xff; 11];
        assert!(matches!(
            get_uvarint(&mut input),
            Err(ProtocolError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_decode_tenth_group_overflow_is_invalid() {
        let mut bytes = vec![0xffu8; 9];
        bytes.push(0x02);
        let mut input = &bytes[..];
        assert!(matches!(
            get_uvarint(&mut input),
            Err(ProtocolError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_uvarint_len_boundaries() {
        assert_eq!(uvarint_len(0), 1);
        assert_eq!(uvarint_len(127), 1);
        assert_eq!(uvarint_len(128), 2);
        assert_eq!(uvarint_len(16383), 2);
        assert_eq!(uvarint_len(16384), 3);
        assert_eq!(uvarint_len(u64::MAX), MAX_VARINT_LEN);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(value in any::<u64>()) {
            let encoded = encode(value);
            prop_assert_eq!(encoded.len(), uvarint_len(value));
            let mut input = &encoded[..];
            prop_assert_eq!(get_uvarint(&mut input).unwrap(), value);
            prop_assert!(input.is_empty());
        }

        #[test]
        fn prop_one_byte_below_128(value in 0u64..128) {
            prop_assert_eq!(encode(value).len(), 1);
        }

        #[test]
        fn prop_two_bytes_up_to_16383(value in 128u64..=16383) {
            prop_assert_eq!(encode(value).len(), 2);
        }
    }
}
