//! Legacy and compact string encodings.
//!
//! - `NULLABLE_STRING`: int16 length, `-1` for null, then that many bytes.
//! - `COMPACT_STRING`: uvarint length biased by one, `0` for null.
//!
//! Bytes are accepted as text without validation; invalid UTF-8 sequences are
//! replaced rather than rejected.

use crate::error::ProtocolError;
use crate::varint::{get_uvarint_usize, put_uvarint};
use crate::wire::{get_bytes, Decode};
use bytes::{Buf, BufMut};

fn text<B: Buf>(buf: &mut B, len: usize) -> Result<String, ProtocolError> {
    let raw = get_bytes(buf, len)?;
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Reads a legacy nullable string.
pub fn get_nullable_string<B: Buf>(buf: &mut B) -> Result<Option<String>, ProtocolError> {
    match i16::decode(buf)? {
        -1 => Ok(None),
        len if len < 0 => Err(ProtocolError::InvalidEncoding(format!(
            "negative string length {len}"
        ))),
        len => text(buf, len as usize).map(Some),
    }
}

/// Writes a legacy nullable string.
///
/// Callers must keep the value within `i16::MAX` bytes.
pub fn put_nullable_string<B: BufMut>(buf: &mut B, value: Option<&str>) {
    match value {
        None => buf.put_i16(-1),
        Some(s) => {
            debug_assert!(
                s.len() <= i16::MAX as usize,
                "nullable string of {} bytes overflows int16 length",
                s.len()
            );
            buf.put_i16(s.len() as i16);
            buf.put_slice(s.as_bytes());
        }
    }
}

/// Reads a compact string that may be null.
pub fn get_compact_nullable_string<B: Buf>(
    buf: &mut B,
) -> Result<Option<String>, ProtocolError> {
    match get_uvarint_usize(buf)? {
        0 => Ok(None),
        len => text(buf, len - 1).map(Some),
    }
}

/// Reads a compact string declared non-nullable.
pub fn get_compact_string<B: Buf>(buf: &mut B) -> Result<String, ProtocolError> {
    get_compact_nullable_string(buf)?
        .ok_or_else(|| ProtocolError::invalid("null compact string in non-nullable field"))
}

pub fn put_compact_string<B: BufMut>(buf: &mut B, value: &str) {
    put_uvarint(buf, value.len() as u64 + 1);
    buf.put_slice(value.as_bytes());
}

pub fn put_compact_nullable_string<B: BufMut>(buf: &mut B, value: Option<&str>) {
    match value {
        None => put_uvarint(buf, 0),
        Some(s) => put_compact_string(buf, s),
    }
}
