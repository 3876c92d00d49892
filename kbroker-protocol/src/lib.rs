//! # kbroker-protocol
//!
//! Wire protocol implementation for kbroker, a Kafka-compatible broker front end.
//!
//! This crate provides:
//! - Unsigned varints, tagged fields, legacy and compact strings
//! - Request header decoding and response header encoding (v0 and v1)
//! - Codecs for the `ApiVersions` and `DescribeTopicPartitions` APIs
//! - Length-prefixed framing with size patching
//!
//! Everything here is a synchronous buffer-to-buffer transformation. The
//! crate performs no I/O and holds no state across frames.

pub mod api_versions;
pub mod codec;
pub mod describe_topic_partitions;
pub mod error;
pub mod frame;
pub mod header;
pub mod message;
pub mod string;
pub mod tagged;
pub mod varint;
pub mod wire;

pub use codec::{Decoder, Encoder};
pub use error::{ErrorCode, ProtocolError};
pub use frame::{Frame, SIZE_PREFIX_LEN};
pub use header::{RequestHeader, ResponseHeader};
pub use message::{ApiKey, Request, RequestBody, Response, ResponseBody};
pub use tagged::TaggedFields;
pub use wire::{Decode, Encode};

/// Default port for kbroker.
pub const DEFAULT_PORT: u16 = 9092;

/// Maximum frame size (100 MiB), matching the broker default for
/// `socket.request.max.bytes`.
pub const MAX_FRAME_SIZE: usize = 100 * 1024 * 1024;
