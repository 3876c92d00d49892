//! Fixed-width primitives and the `Decode`/`Encode` traits.
//!
//! All fixed-width integers are big-endian two's complement. Reads are
//! bounds-checked and fail with [`ProtocolError::Truncated`] instead of
//! panicking the way the raw `Buf` getters do.

use crate::error::ProtocolError;
use crate::varint::{get_uvarint_usize, put_uvarint};
use bytes::{Buf, BufMut, Bytes};
use uuid::Uuid;

/// A value that can be read from the wire.
pub trait Decode: Sized {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError>;
}

/// A value that can be written to the wire.
pub trait Encode {
    fn encode<B: BufMut>(&self, buf: &mut B);
}

/// Fails with `Truncated` unless `needed` bytes remain.
pub fn ensure_remaining<B: Buf>(buf: &B, needed: usize) -> Result<(), ProtocolError> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(ProtocolError::Truncated { needed, remaining });
    }
    Ok(())
}

/// Reads exactly `len` raw bytes.
pub fn get_bytes<B: Buf>(buf: &mut B, len: usize) -> Result<Bytes, ProtocolError> {
    ensure_remaining(buf, len)?;
    Ok(buf.copy_to_bytes(len))
}

macro_rules! impl_fixed {
    ($ty:ty, $get:ident, $put:ident) => {
        impl Decode for $ty {
            fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
                ensure_remaining(buf, std::mem::size_of::<$ty>())?;
                Ok(buf.$get())
            }
        }

        impl Encode for $ty {
            fn encode<B: BufMut>(&self, buf: &mut B) {
                buf.$put(*self);
            }
        }
    };
}

impl_fixed!(i8, get_i8, put_i8);
impl_fixed!(u8, get_u8, put_u8);
impl_fixed!(i16, get_i16, put_i16);
impl_fixed!(i32, get_i32, put_i32);

/// UUID: 16 raw bytes.
impl Decode for Uuid {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        ensure_remaining(buf, 16)?;
        let mut bytes = [0u8; 16];
        buf.copy_to_slice(&mut bytes);
        Ok(Uuid::from_bytes(bytes))
    }
}

impl Encode for Uuid {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(self.as_bytes());
    }
}

/// Reads a compact array: a varint count biased by one, then the elements.
///
/// A wire count of zero is a null array and reads as empty.
pub fn get_compact_array<B: Buf, T: Decode>(buf: &mut B) -> Result<Vec<T>, ProtocolError> {
    let len = match get_uvarint_usize(buf)? {
        0 => return Ok(Vec::new()),
        n => n - 1,
    };
    // Every element occupies at least one byte.
    let mut items = Vec::with_capacity(len.min(buf.remaining()));
    for _ in 0..len {
        items.push(T::decode(buf)?);
    }
    Ok(items)
}

/// Writes a compact array with a count biased by one.
pub fn put_compact_array<B: BufMut, T: Encode>(buf: &mut B, items: &[T]) {
    put_uvarint(buf, items.len() as u64 + 1);
    for item in items {
        item.encode(buf);
    }
}
