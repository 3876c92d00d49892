//! Streaming decoder and frame encoder.

use crate::error::ProtocolError;
use crate::frame::Frame;
use crate::message::{ApiKey, Request, Response};
use crate::MAX_FRAME_SIZE;
use bytes::{Bytes, BytesMut};

/// Encodes requests and responses into frames.
pub struct Encoder;

impl Encoder {
    /// Encodes a request into a frame.
    pub fn encode_request(request: &Request) -> Result<BytesMut, ProtocolError> {
        request.encode()
    }

    /// Encodes a response into a frame.
    pub fn encode_response(response: &Response) -> Result<BytesMut, ProtocolError> {
        response.encode()
    }
}

/// Accumulates bytes read from a connection and yields complete messages.
pub struct Decoder {
    buffer: BytesMut,
    max_frame_size: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_max_frame_size(MAX_FRAME_SIZE)
    }

    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            max_frame_size,
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Appends bytes to the internal buffer.
    pub fn extend_bytes(&mut self, data: Bytes) {
        self.buffer.extend_from_slice(&data);
    }

    /// Attempts to split the next frame from the buffer.
    pub fn decode_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        Frame::decode(&mut self.buffer, self.max_frame_size)
    }

    /// Attempts to decode the next request from the buffer.
    pub fn decode_request(&mut self) -> Result<Option<Request>, ProtocolError> {
        match self.decode_frame()? {
            Some(frame) => Request::decode(frame.payload).map(Some),
            None => Ok(None),
        }
    }

    /// Attempts to decode the next response, parsed as a reply to `api_key`.
    pub fn decode_response(&mut self, api_key: ApiKey) -> Result<Option<Response>, ProtocolError> {
        match self.decode_frame()? {
            Some(frame) => Response::decode(api_key, frame.payload).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_versions::{ApiVersionsRequest, ApiVersionsResponse};
    use crate::describe_topic_partitions::DescribeTopicPartitionsRequest;
    use crate::message::{RequestBody, ResponseBody};

    fn api_versions(correlation_id: i32) -> Request {
        Request::new(
            4,
            correlation_id,
            RequestBody::ApiVersions(ApiVersionsRequest),
        )
    }

    #[test]
    fn test_encoder_decoder_roundtrip() {
        let encoded = Encoder::encode_request(&api_versions(42)).unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded);

        let decoded = decoder.decode_request().unwrap().unwrap();
        assert_eq!(decoded.header.correlation_id, 42);
        assert_eq!(decoded.api_key(), ApiKey::ApiVersions);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_partial_frame_decoding() {
        let encoded = Encoder::encode_request(&api_versions(1)).unwrap();

        let mut decoder = Decoder::new();

        // Feed partial data
        decoder.extend(&encoded[..6]);
        assert!(decoder.decode_request().unwrap().is_none());

        // Feed the rest
        decoder.extend(&encoded[6..]);
        let decoded = decoder.decode_request().unwrap().unwrap();
        assert_eq!(decoded.header.correlation_id, 1);
    }

    #[test]
    fn test_sequential_requests_in_buffer() {
        let first = Encoder::encode_request(&api_versions(1)).unwrap();
        let second = Encoder::encode_request(&Request::new(
            0,
            2,
            RequestBody::DescribeTopicPartitions(DescribeTopicPartitionsRequest::new(["a"])),
        ))
        .unwrap();

        let mut decoder = Decoder::new();
        decoder.extend_bytes(first.freeze());
        decoder.extend_bytes(second.freeze());

        let decoded1 = decoder.decode_request().unwrap().unwrap();
        let decoded2 = decoder.decode_request().unwrap().unwrap();
        assert_eq!(decoded1.api_key(), ApiKey::ApiVersions);
        assert_eq!(decoded2.api_key(), ApiKey::DescribeTopicPartitions);
        assert!(decoder.decode_request().unwrap().is_none());
    }

    #[test]
    fn test_frame_limit_enforced() {
        let encoded = Encoder::encode_request(&api_versions(1)).unwrap();

        let mut decoder = Decoder::with_max_frame_size(4);
        decoder.extend(&encoded);
        assert!(matches!(
            decoder.decode_request(),
            Err(ProtocolError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_decode_response() {
        let response = Response::new(5, ApiVersionsResponse::new(35, Vec::new()));
        let encoded = Encoder::encode_response(&response).unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded);
        let decoded = decoder
            .decode_response(ApiKey::ApiVersions)
            .unwrap()
            .unwrap();

        assert_eq!(decoded.correlation_id(), 5);
        match decoded.body {
            ResponseBody::ApiVersions(body) => assert_eq!(body.error_code, 35),
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn test_decoder_buffered() {
        let mut decoder = Decoder::default();
        assert_eq!(decoder.buffered(), 0);

        decoder.extend(b"some data");
        assert_eq!(decoder.buffered(), 9);

        decoder.clear();
        assert_eq!(decoder.buffered(), 0);
    }
}
