//! Server error types.

use crate::config::ConfigError;
use kbroker_protocol::ProtocolError;
use thiserror::Error;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server shutting down")]
    ShuttingDown,
}

impl ServerError {
    /// Returns whether the error came from a malformed or unsupported request,
    /// as opposed to the transport itself failing.
    pub fn is_decode_failure(&self) -> bool {
        match self {
            ServerError::Protocol(ProtocolError::Io(_)) => false,
            ServerError::Protocol(_) => true,
            _ => false,
        }
    }
}
