//! # kbroker-server
//!
//! TCP server for kbroker.
//!
//! This crate provides:
//! - TCP connection handling with async I/O, one task per connection
//! - Frame decoding and request dispatch
//! - Per-connection session bookkeeping
//! - Request handlers for `ApiVersions` and `DescribeTopicPartitions`

pub mod config;
pub mod error;
pub mod handler;
pub mod server;
pub mod session;

pub use config::{Config, ConfigError, DebugConfig, NetworkConfig};
pub use error::ServerError;
pub use handler::RequestHandler;
pub use server::{Server, ServerConfig, ServerStats};
pub use session::Session;
