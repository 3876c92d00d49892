//! Tagged fields.
//!
//! Wire layout:
//!
//! ```text
//! +-------+------------------------------------------+
//! | count | count x ( tag | length | length bytes )  |
//! | uvar  |          uvar   uvar                     |
//! +-------+------------------------------------------+
//! ```
//!
//! Entries are kept sorted by tag so the encoded form is byte-stable.

use crate::error::ProtocolError;
use crate::varint::{get_uvarint, get_uvarint_usize, put_uvarint};
use crate::wire::{get_bytes, Decode, Encode};
use bytes::{Buf, BufMut, Bytes};
use std::collections::BTreeMap;

/// An ordered tag -> raw bytes mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedFields {
    fields: BTreeMap<u64, Bytes>,
}

impl TaggedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, returning the previous value for `tag` if any.
    pub fn insert(&mut self, tag: u64, data: impl Into<Bytes>) -> Option<Bytes> {
        self.fields.insert(tag, data.into())
    }

    pub fn with_field(mut self, tag: u64, data: impl Into<Bytes>) -> Self {
        self.insert(tag, data);
        self
    }

    pub fn get(&self, tag: u64) -> Option<&Bytes> {
        self.fields.get(&tag)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates entries in ascending tag order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Bytes)> {
        self.fields.iter().map(|(tag, data)| (*tag, data))
    }
}

impl Decode for TaggedFields {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        let count = get_uvarint(buf)?;
        let mut fields = BTreeMap::new();
        for _ in 0..count {
            let tag = get_uvarint(buf)?;
            let len = get_uvarint_usize(buf)?;
            let data = get_bytes(buf, len)?;
            if fields.insert(tag, data).is_some() {
                return Err(ProtocolError::InvalidEncoding(format!(
                    "duplicate tagged field {tag}"
                )));
            }
        }
        Ok(Self { fields })
    }
}

impl Encode for TaggedFields {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        put_uvarint(buf, self.fields.len() as u64);
        for (tag, data) in &self.fields {
            put_uvarint(buf, *tag);
            put_uvarint(buf, data.len() as u64);
            buf.put_slice(data);
        }
    }
}
