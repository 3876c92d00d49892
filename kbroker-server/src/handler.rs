//! Request handlers.
//!
//! Maps each decoded request to its response. Handlers never fail: a version
//! the broker cannot serve is reported through the response's error code.

use crate::session::Session;
use kbroker_protocol::api_versions::{self, ApiVersion, ApiVersionsResponse};
use kbroker_protocol::describe_topic_partitions::{
    self, DescribeTopicPartitionsRequest, DescribeTopicPartitionsResponse, ResponseTopic,
};
use kbroker_protocol::{ApiKey, ErrorCode, Request, RequestBody, Response};

/// Versions advertised for each supported API.
#[derive(Debug, Clone)]
pub struct SupportedApis {
    apis: Vec<ApiVersion>,
}

impl Default for SupportedApis {
    fn default() -> Self {
        Self {
            apis: vec![
                ApiVersion::new(
                    ApiKey::ApiVersions.code(),
                    api_versions::MIN_VERSION,
                    api_versions::MAX_VERSION,
                ),
                ApiVersion::new(
                    ApiKey::DescribeTopicPartitions.code(),
                    0,
                    describe_topic_partitions::MAX_VERSION,
                ),
            ],
        }
    }
}

impl SupportedApis {
    pub fn get(&self, api_key: ApiKey) -> Option<&ApiVersion> {
        self.apis.iter().find(|v| v.api_key == api_key.code())
    }

    pub fn as_slice(&self) -> &[ApiVersion] {
        &self.apis
    }
}

/// Request handler.
#[derive(Debug, Clone, Default)]
pub struct RequestHandler {
    supported: SupportedApis,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a request and returns its response.
    pub fn handle(&self, session: &mut Session, request: &Request) -> Response {
        session.record_request();
        let correlation_id = request.header.correlation_id;

        match &request.body {
            RequestBody::ApiVersions(_) => {
                Response::new(correlation_id, self.api_versions(request.header.api_version))
            }
            RequestBody::DescribeTopicPartitions(body) => {
                Response::new(correlation_id, self.describe_topic_partitions(body))
            }
        }
    }

    fn api_versions(&self, api_version: i16) -> ApiVersionsResponse {
        let supported = self
            .supported
            .get(ApiKey::ApiVersions)
            .is_some_and(|range| range.supports(api_version));

        let error_code = if supported {
            ErrorCode::None
        } else {
            tracing::debug!("ApiVersions v{} is not supported", api_version);
            ErrorCode::UnsupportedVersion
        };

        // The full list goes out either way so the client can retry with a
        // version it finds there.
        ApiVersionsResponse::new(error_code.code(), self.supported.as_slice().to_vec())
    }

    fn describe_topic_partitions(
        &self,
        request: &DescribeTopicPartitionsRequest,
    ) -> DescribeTopicPartitionsResponse {
        // No topic metadata is kept, so every topic is unknown.
        let topics = request
            .topics
            .iter()
            .map(|topic| {
                ResponseTopic::unknown(
                    topic.name.clone(),
                    ErrorCode::UnknownTopicOrPartition.code(),
                )
            })
            .collect();
        DescribeTopicPartitionsResponse::new(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbroker_protocol::api_versions::ApiVersionsRequest;
    use kbroker_protocol::{ResponseBody, ResponseHeader};
    use uuid::Uuid;

    fn session() -> Session {
        Session::new("127.0.0.1:40000".parse().unwrap())
    }

    fn api_versions_request(version: i16, correlation_id: i32) -> Request {
        Request::new(
            version,
            correlation_id,
            RequestBody::ApiVersions(ApiVersionsRequest),
        )
    }

    fn api_versions_body(response: Response) -> ApiVersionsResponse {
        match response.body {
            ResponseBody::ApiVersions(body) => body,
            other => panic!("expected ApiVersions body, got {other:?}"),
        }
    }

    #[test]
    fn test_api_versions_supported() {
        let handler = RequestHandler::new();
        let response = handler.handle(&mut session(), &api_versions_request(4, 311908132));

        assert_eq!(response.header, ResponseHeader::v0(311908132));
        let body = api_versions_body(response);
        assert_eq!(body.error_code, 0);
        assert_eq!(body.api_keys.len(), 2);

        let entries: Vec<_> = body
            .api_keys
            .iter()
            .map(|v| (v.api_key, v.min_version, v.max_version))
            .collect();
        assert_eq!(entries, vec![(18, 0, 4), (75, 0, 0)]);
    }

    #[test]
    fn test_api_versions_lowest_version() {
        let handler = RequestHandler::new();
        let body = api_versions_body(handler.handle(&mut session(), &api_versions_request(0, 1)));
        assert_eq!(body.error_code, 0);
    }

    #[test]
    fn test_api_versions_unsupported() {
        let handler = RequestHandler::new();
        let response = handler.handle(&mut session(), &api_versions_request(5, 1234));

        assert_eq!(response.correlation_id(), 1234);
        let body = api_versions_body(response);
        assert_eq!(body.error_code, 35);
        assert_eq!(body.api_keys.len(), 2);
    }

    #[test]
    fn test_api_versions_negative_version() {
        let handler = RequestHandler::new();
        let body = api_versions_body(handler.handle(&mut session(), &api_versions_request(-1, 1)));
        assert_eq!(body.error_code, ErrorCode::UnsupportedVersion.code());
    }

    #[test]
    fn test_describe_unknown_topic() {
        let handler = RequestHandler::new();
        let request = Request::new(
            0,
            77,
            RequestBody::DescribeTopicPartitions(DescribeTopicPartitionsRequest::new([
                "unknown-topic",
            ])),
        );
        let response = handler.handle(&mut session(), &request);

        assert_eq!(response.header, ResponseHeader::v1(77));
        let body = match response.body {
            ResponseBody::DescribeTopicPartitions(body) => body,
            other => panic!("unexpected body: {other:?}"),
        };
        assert_eq!(body.topics.len(), 1);
        let topic = &body.topics[0];
        assert_eq!(topic.error_code, 3);
        assert_eq!(topic.name, "unknown-topic");
        assert_eq!(topic.topic_id, Uuid::nil());
        assert!(topic.partitions.is_empty());
        assert_eq!(topic.topic_authorized_operations, 0);
        assert!(body.next_cursor.is_none());
    }

    #[test]
    fn test_describe_preserves_topic_order() {
        let handler = RequestHandler::new();
        let request = Request::new(
            0,
            1,
            RequestBody::DescribeTopicPartitions(DescribeTopicPartitionsRequest::new([
                "zeta", "alpha", "mid",
            ])),
        );
        let response = handler.handle(&mut session(), &request);
        let ResponseBody::DescribeTopicPartitions(body) = response.body else {
            panic!("unexpected body");
        };
        let names: Vec<_> = body.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_handle_counts_requests() {
        let handler = RequestHandler::new();
        let mut session = session();
        handler.handle(&mut session, &api_versions_request(4, 1));
        handler.handle(&mut session, &api_versions_request(4, 2));
        assert_eq!(session.request_count(), 2);
    }

    #[test]
    fn test_response_size_prefix() {
        let handler = RequestHandler::new();
        let frame = handler
            .handle(&mut session(), &api_versions_request(4, 9))
            .encode()
            .unwrap();
        let size = i32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]);
        assert_eq!(size as usize, frame.len() - 4);
    }
}
