//! `ApiVersions` (API key 18): capability negotiation.

use crate::error::ProtocolError;
use crate::tagged::TaggedFields;
use crate::wire::{get_compact_array, put_compact_array, Decode, Encode};
use bytes::{Buf, BufMut};

/// Lowest `ApiVersions` version this broker answers.
pub const MIN_VERSION: i16 = 0;

/// Highest `ApiVersions` version this broker answers.
pub const MAX_VERSION: i16 = 4;

/// `ApiVersions` request body. The modelled versions carry no fields the
/// broker reads, so nothing is consumed from the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiVersionsRequest;

impl Decode for ApiVersionsRequest {
    fn decode<B: Buf>(_buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(ApiVersionsRequest)
    }
}

impl Encode for ApiVersionsRequest {
    fn encode<B: BufMut>(&self, _buf: &mut B) {}
}

/// One supported API and its inclusive version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion {
    pub api_key: i16,
    pub min_version: i16,
    pub max_version: i16,
    pub tagged_fields: TaggedFields,
}

impl ApiVersion {
    pub fn new(api_key: i16, min_version: i16, max_version: i16) -> Self {
        Self {
            api_key,
            min_version,
            max_version,
            tagged_fields: TaggedFields::new(),
        }
    }

    /// Returns whether `version` falls inside the advertised range.
    pub fn supports(&self, version: i16) -> bool {
        (self.min_version..=self.max_version).contains(&version)
    }
}

impl Decode for ApiVersion {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            api_key: i16::decode(buf)?,
            min_version: i16::decode(buf)?,
            max_version: i16::decode(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for ApiVersion {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i16(self.api_key);
        buf.put_i16(self.min_version);
        buf.put_i16(self.max_version);
        self.tagged_fields.encode(buf);
    }
}

/// `ApiVersions` response body (v4 layout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersionsResponse {
    pub error_code: i16,
    pub api_keys: Vec<ApiVersion>,
    pub throttle_time_ms: i32,
    pub tagged_fields: TaggedFields,
}

impl ApiVersionsResponse {
    pub fn new(error_code: i16, api_keys: Vec<ApiVersion>) -> Self {
        Self {
            error_code,
            api_keys,
            throttle_time_ms: 0,
            tagged_fields: TaggedFields::new(),
        }
    }

    /// Looks up the advertised range for `api_key`.
    pub fn find(&self, api_key: i16) -> Option<&ApiVersion> {
        self.api_keys.iter().find(|v| v.api_key == api_key)
    }
}

impl Decode for ApiVersionsResponse {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            error_code: i16::decode(buf)?,
            api_keys: get_compact_array(buf)?,
            throttle_time_ms: i32::decode(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for ApiVersionsResponse {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i16(self.error_code);
        put_compact_array(buf, &self.api_keys);
        buf.put_i32(self.throttle_time_ms);
        self.tagged_fields.encode(buf);
    }
}
