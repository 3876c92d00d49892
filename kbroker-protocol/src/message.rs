//! Request and response envelopes.
//!
//! The set of supported APIs is closed: [`ApiKey`] is resolved once from the
//! header and selects both the body codec and the response header shape.

use crate::api_versions::{ApiVersionsRequest, ApiVersionsResponse};
use crate::describe_topic_partitions::{
    DescribeTopicPartitionsRequest, DescribeTopicPartitionsResponse,
};
use crate::error::ProtocolError;
use crate::frame::Frame;
use crate::header::{RequestHeader, ResponseHeader};
use crate::wire::{Decode, Encode};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

/// Supported API keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ApiKey {
    ApiVersions = 18,
    DescribeTopicPartitions = 75,
}

impl ApiKey {
    pub fn code(self) -> i16 {
        self as i16
    }

    pub fn from_code(code: i16) -> Result<Self, ProtocolError> {
        match code {
            18 => Ok(ApiKey::ApiVersions),
            75 => Ok(ApiKey::DescribeTopicPartitions),
            other => Err(ProtocolError::UnsupportedApiKey(other)),
        }
    }

    /// Response header version used by this API.
    ///
    /// `ApiVersions` always answers with header v0 so that clients can parse
    /// the reply before any version has been negotiated.
    pub fn response_header_version(self) -> i16 {
        match self {
            ApiKey::ApiVersions => 0,
            ApiKey::DescribeTopicPartitions => 1,
        }
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKey::ApiVersions => write!(f, "ApiVersions"),
            ApiKey::DescribeTopicPartitions => write!(f, "DescribeTopicPartitions"),
        }
    }
}

/// Request body, one variant per supported API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    ApiVersions(ApiVersionsRequest),
    DescribeTopicPartitions(DescribeTopicPartitionsRequest),
}

impl RequestBody {
    pub fn api_key(&self) -> ApiKey {
        match self {
            RequestBody::ApiVersions(_) => ApiKey::ApiVersions,
            RequestBody::DescribeTopicPartitions(_) => ApiKey::DescribeTopicPartitions,
        }
    }

    /// Decodes the body registered for `api_key`.
    pub fn decode<B: Buf>(api_key: ApiKey, buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(match api_key {
            ApiKey::ApiVersions => RequestBody::ApiVersions(ApiVersionsRequest::decode(buf)?),
            ApiKey::DescribeTopicPartitions => {
                RequestBody::DescribeTopicPartitions(DescribeTopicPartitionsRequest::decode(buf)?)
            }
        })
    }
}

impl Encode for RequestBody {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            RequestBody::ApiVersions(body) => body.encode(buf),
            RequestBody::DescribeTopicPartitions(body) => body.encode(buf),
        }
    }
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub header: RequestHeader,
    pub body: RequestBody,
}

impl Request {
    /// Builds a request whose header API key matches the body.
    pub fn new(api_version: i16, correlation_id: i32, body: RequestBody) -> Self {
        Self {
            header: RequestHeader::new(body.api_key().code(), api_version, correlation_id),
            body,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.header.client_id = Some(client_id.into());
        self
    }

    pub fn api_key(&self) -> ApiKey {
        self.body.api_key()
    }

    /// Decodes a frame payload (size prefix already stripped).
    ///
    /// Bytes after the body are ignored: newer request versions append fields
    /// this broker does not read.
    pub fn decode(mut payload: Bytes) -> Result<Self, ProtocolError> {
        let header = RequestHeader::decode(&mut payload)?;
        let api_key = ApiKey::from_code(header.api_key)?;
        let body = RequestBody::decode(api_key, &mut payload)?;
        Ok(Self { header, body })
    }

    /// Decodes one complete frame, size prefix included.
    pub fn decode_frame(frame: &[u8]) -> Result<Self, ProtocolError> {
        Self::decode(Frame::payload_of(frame)?)
    }

    /// Encodes the request as a size-prefixed frame.
    ///
    /// Fails if the client id does not fit an int16 length.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        if let Some(client_id) = &self.header.client_id {
            if client_id.len() > i16::MAX as usize {
                return Err(ProtocolError::InvalidEncoding(format!(
                    "client id of {} bytes exceeds {}",
                    client_id.len(),
                    i16::MAX
                )));
            }
        }
        Frame::encode_with(|buf| {
            self.header.encode(buf);
            self.body.encode(buf);
        })
    }
}

/// Response body, one variant per supported API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    ApiVersions(ApiVersionsResponse),
    DescribeTopicPartitions(DescribeTopicPartitionsResponse),
}

impl ResponseBody {
    pub fn api_key(&self) -> ApiKey {
        match self {
            ResponseBody::ApiVersions(_) => ApiKey::ApiVersions,
            ResponseBody::DescribeTopicPartitions(_) => ApiKey::DescribeTopicPartitions,
        }
    }

    pub fn decode<B: Buf>(api_key: ApiKey, buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(match api_key {
            ApiKey::ApiVersions => ResponseBody::ApiVersions(ApiVersionsResponse::decode(buf)?),
            ApiKey::DescribeTopicPartitions => ResponseBody::DescribeTopicPartitions(
                DescribeTopicPartitionsResponse::decode(buf)?,
            ),
        })
    }
}

impl Encode for ResponseBody {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        match self {
            ResponseBody::ApiVersions(body) => body.encode(buf),
            ResponseBody::DescribeTopicPartitions(body) => body.encode(buf),
        }
    }
}

impl From<ApiVersionsResponse> for ResponseBody {
    fn from(body: ApiVersionsResponse) -> Self {
        ResponseBody::ApiVersions(body)
    }
}

impl From<DescribeTopicPartitionsResponse> for ResponseBody {
    fn from(body: DescribeTopicPartitionsResponse) -> Self {
        ResponseBody::DescribeTopicPartitions(body)
    }
}

/// A response ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: ResponseHeader,
    pub body: ResponseBody,
}

impl Response {
    /// Builds a response, choosing the header shape the body's API requires.
    pub fn new(correlation_id: i32, body: impl Into<ResponseBody>) -> Self {
        let body = body.into();
        let header = match body.api_key().response_header_version() {
            0 => ResponseHeader::v0(correlation_id),
            _ => ResponseHeader::v1(correlation_id),
        };
        Self { header, body }
    }

    pub fn correlation_id(&self) -> i32 {
        self.header.correlation_id()
    }

    /// Encodes header and body behind a patched size prefix.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        Frame::encode_with(|buf| {
            self.header.encode(buf);
            self.body.encode(buf);
        })
    }

    /// Decodes a frame payload as the response to a request for `api_key`.
    pub fn decode(api_key: ApiKey, mut payload: Bytes) -> Result<Self, ProtocolError> {
        let header = match api_key.response_header_version() {
            0 => ResponseHeader::decode_v0(&mut payload)?,
            _ => ResponseHeader::decode_v1(&mut payload)?,
        };
        let body = ResponseBody::decode(api_key, &mut payload)?;
        Ok(Self { header, body })
    }

    /// Decodes one complete frame, size prefix included.
    pub fn decode_frame(api_key: ApiKey, frame: &[u8]) -> Result<Self, ProtocolError> {
        Self::decode(api_key, Frame::payload_of(frame)?)
    }
}
