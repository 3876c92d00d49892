//! `DescribeTopicPartitions` (API key 75): topic metadata lookup.
//!
//! Both directions use the flexible convention throughout: compact strings,
//! compact arrays and a tag buffer at the end of every struct. The one
//! exception is [`Node`], which is a bare int32.
//!
//! The cursor is a nullable struct. Its presence marker is an int8: `-1` when
//! absent, `1` when the cursor fields follow.

use crate::error::ProtocolError;
use crate::string::{get_compact_string, put_compact_string};
use crate::tagged::TaggedFields;
use crate::wire::{get_compact_array, put_compact_array, Decode, Encode};
use bytes::{Buf, BufMut};
use uuid::Uuid;

/// Highest `DescribeTopicPartitions` version this broker answers.
pub const MAX_VERSION: i16 = 0;

const CURSOR_ABSENT: i8 = -1;
const CURSOR_PRESENT: i8 = 1;

/// Pagination position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub topic_name: String,
    pub partition_index: i32,
    pub tagged_fields: TaggedFields,
}

impl Cursor {
    pub fn new(topic_name: impl Into<String>, partition_index: i32) -> Self {
        Self {
            topic_name: topic_name.into(),
            partition_index,
            tagged_fields: TaggedFields::new(),
        }
    }
}

impl Decode for Cursor {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            topic_name: get_compact_string(buf)?,
            partition_index: i32::decode(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for Cursor {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        put_compact_string(buf, &self.topic_name);
        buf.put_i32(self.partition_index);
        self.tagged_fields.encode(buf);
    }
}

fn get_nullable_cursor<B: Buf>(buf: &mut B) -> Result<Option<Cursor>, ProtocolError> {
    match i8::decode(buf)? {
        CURSOR_ABSENT => Ok(None),
        _ => Cursor::decode(buf).map(Some),
    }
}

fn put_nullable_cursor<B: BufMut>(buf: &mut B, cursor: Option<&Cursor>) {
    match cursor {
        None => buf.put_i8(CURSOR_ABSENT),
        Some(cursor) => {
            buf.put_i8(CURSOR_PRESENT);
            cursor.encode(buf);
        }
    }
}

/// A topic named in the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRequest {
    pub name: String,
    pub tagged_fields: TaggedFields,
}

impl TopicRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tagged_fields: TaggedFields::new(),
        }
    }
}

impl Decode for TopicRequest {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: get_compact_string(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for TopicRequest {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        put_compact_string(buf, &self.name);
        self.tagged_fields.encode(buf);
    }
}

/// `DescribeTopicPartitions` request body (v0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsRequest {
    pub topics: Vec<TopicRequest>,
    pub response_partition_limit: i32,
    pub cursor: Option<Cursor>,
    pub tagged_fields: TaggedFields,
}

impl DescribeTopicPartitionsRequest {
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(TopicRequest::new).collect(),
            response_partition_limit: 2000,
            cursor: None,
            tagged_fields: TaggedFields::new(),
        }
    }
}

impl Decode for DescribeTopicPartitionsRequest {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            topics: get_compact_array(buf)?,
            response_partition_limit: i32::decode(buf)?,
            cursor: get_nullable_cursor(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for DescribeTopicPartitionsRequest {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        put_compact_array(buf, &self.topics);
        buf.put_i32(self.response_partition_limit);
        put_nullable_cursor(buf, self.cursor.as_ref());
        self.tagged_fields.encode(buf);
    }
}

/// A broker node reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id: i32,
}

impl Decode for Node {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            id: i32::decode(buf)?,
        })
    }
}

impl Encode for Node {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32(self.id);
    }
}

/// Partition metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
    pub leader_epoch: i32,
    pub replica_nodes: Vec<Node>,
    pub isr_nodes: Vec<Node>,
    pub eligible_leader_replicas: Vec<Node>,
    pub last_known_elr: Vec<Node>,
    pub offline_replicas: Vec<Node>,
    pub tagged_fields: TaggedFields,
}

impl Decode for Partition {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            error_code: i16::decode(buf)?,
            partition_index: i32::decode(buf)?,
            leader_id: i32::decode(buf)?,
            leader_epoch: i32::decode(buf)?,
            replica_nodes: get_compact_array(buf)?,
            isr_nodes: get_compact_array(buf)?,
            eligible_leader_replicas: get_compact_array(buf)?,
            last_known_elr: get_compact_array(buf)?,
            offline_replicas: get_compact_array(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for Partition {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i16(self.error_code);
        buf.put_i32(self.partition_index);
        buf.put_i32(self.leader_id);
        buf.put_i32(self.leader_epoch);
        put_compact_array(buf, &self.replica_nodes);
        put_compact_array(buf, &self.isr_nodes);
        put_compact_array(buf, &self.eligible_leader_replicas);
        put_compact_array(buf, &self.last_known_elr);
        put_compact_array(buf, &self.offline_replicas);
        self.tagged_fields.encode(buf);
    }
}

/// Per-topic result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseTopic {
    pub error_code: i16,
    pub name: String,
    pub topic_id: Uuid,
    /// Raw flag byte, kept as sent.
    pub is_internal: u8,
    pub partitions: Vec<Partition>,
    pub topic_authorized_operations: i32,
    pub tagged_fields: TaggedFields,
}

impl ResponseTopic {
    /// A result for a topic the broker has no record of.
    pub fn unknown(name: impl Into<String>, error_code: i16) -> Self {
        Self {
            error_code,
            name: name.into(),
            topic_id: Uuid::nil(),
            is_internal: 0,
            partitions: Vec::new(),
            topic_authorized_operations: 0,
            tagged_fields: TaggedFields::new(),
        }
    }
}

impl Decode for ResponseTopic {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            error_code: i16::decode(buf)?,
            name: get_compact_string(buf)?,
            topic_id: Uuid::decode(buf)?,
            is_internal: u8::decode(buf)?,
            partitions: get_compact_array(buf)?,
            topic_authorized_operations: i32::decode(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for ResponseTopic {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i16(self.error_code);
        put_compact_string(buf, &self.name);
        self.topic_id.encode(buf);
        buf.put_u8(self.is_internal);
        put_compact_array(buf, &self.partitions);
        buf.put_i32(self.topic_authorized_operations);
        self.tagged_fields.encode(buf);
    }
}

/// `DescribeTopicPartitions` response body (v0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTopicPartitionsResponse {
    pub throttle_time_ms: i32,
    pub topics: Vec<ResponseTopic>,
    pub next_cursor: Option<Cursor>,
    pub tagged_fields: TaggedFields,
}

impl DescribeTopicPartitionsResponse {
    pub fn new(topics: Vec<ResponseTopic>) -> Self {
        Self {
            throttle_time_ms: 0,
            topics,
            next_cursor: None,
            tagged_fields: TaggedFields::new(),
        }
    }
}

impl Decode for DescribeTopicPartitionsResponse {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, ProtocolError> {
        Ok(Self {
            throttle_time_ms: i32::decode(buf)?,
            topics: get_compact_array(buf)?,
            next_cursor: get_nullable_cursor(buf)?,
            tagged_fields: TaggedFields::decode(buf)?,
        })
    }
}

impl Encode for DescribeTopicPartitionsResponse {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_i32(self.throttle_time_ms);
        put_compact_array(buf, &self.topics);
        put_nullable_cursor(buf, self.next_cursor.as_ref());
        self.tagged_fields.encode(buf);
    }
}
