//! Request and response headers.
//!
//! Request header (v2):
//!
//! ```text
//! +---------+-------------+----------------+-----------------+---------------+
//! | api_key | api_version | correlation_id | client_id       | tagged_fields |
//! | int16   | int16       | int32          | NULLABLE_STRING | TAG_BUFFER    |
//! +---------+-------------+----------------+-----------------+---------------+
//! ```
//!
//! Response header v0 is the correlation id alone; v1 appends a tag buffer.

use crate::error::ProtocolError;
use crate::string::{get_nullable_string, put_nullable_string};
use crate::tagged::TaggedFields;
use crate::wire::{Decode, Encode};
use bytes::{Buf, BufMut};

/// Decoded request header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
    pub client_id: Option<String>,
    pub tagged_fields: TaggedFields,
}

impl RequestHeader {
    pub fn new(api_key: i16, api_version: i16, correlation_id: i32) -> Self {
        Self {
            api_key,
            api_version,
            correlation_id,
            client_id: None,
            tagged_fields: TaggedFields::new(),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

impl Decode for RequestHeader {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            api_key: i16::decode(buf)?,
            api_version: i16::decode(buf)?,
            correlation_id: i32::decode(buf)?,
            client_id: get_nullable_string(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for RequestHeader {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i16(self.api_key);
        buf.put_i16(self.api_version);
        buf.put_i32(self.correlation_id);
        // Length checked by `Request::encode`.
        put_nullable_string(buf, self.client_id.as_deref());
        self.tagged_fields.encode(buf);
    }
}

/// Response header, in one of its two wire shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseHeader {
    V0 {
        correlation_id: i32,
    },
    V1 {
        correlation_id: i32,
        tagged_fields: TaggedFields,
    },
}

impl ResponseHeader {
    pub fn v0(correlation_id: i32) -> Self {
        ResponseHeader::V0 { correlation_id }
    }

    pub fn v1(correlation_id: i32) -> Self {
        ResponseHeader::V1 {
            correlation_id,
            tagged_fields: TaggedFields::new(),
        }
    }

    pub fn correlation_id(&self) -> i32 {
        match self {
            ResponseHeader::V0 { correlation_id } | ResponseHeader::V1 { correlation_id, .. } => {
                *correlation_id
            }
        }
    }

    pub fn version(&self) -> i16 {
        match self {
            ResponseHeader::V0 { .. } => 0,
            ResponseHeader::V1 { .. } => 1,
        }
    }

    pub fn decode_v0<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(ResponseHeader::V0 {
            correlation_id: i32::decode(buf)?,
        })
    }

    pub fn decode_v1<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(ResponseHeader::V1 {
            correlation_id: i32::decode(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for ResponseHeader {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            ResponseHeader::V0 { correlation_id } => buf.put_i32(*correlation_id),
            ResponseHeader::V1 {
                correlation_id,
                tagged_fields,
            } => {
                buf.put_i32(*correlation_id);
                tagged_fields.encode(buf);
            }
        }
    }
}
