//! Protocol error types and wire error codes.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while decoding or encoding frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("truncated input: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("unsupported API key: {0}")]
    UnsupportedApiKey(i16),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ProtocolError::InvalidEncoding(msg.into())
    }
}

/// Error codes carried inside response bodies.
///
/// Numeric values are part of the external wire contract and match the
/// upstream broker's error table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ErrorCode {
    None = 0,
    UnknownTopicOrPartition = 3,
    UnsupportedVersion = 35,
}

impl ErrorCode {
    /// Returns the wire value of this code.
    pub fn code(self) -> i16 {
        self as i16
    }

    /// Maps a wire value back to a known code.
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::None),
            3 => Some(ErrorCode::UnknownTopicOrPartition),
            35 => Some(ErrorCode::UnsupportedVersion),
            _ => None,
        }
    }

    /// Returns whether a client may retry the request unchanged.
    pub fn is_retriable(self) -> bool {
        matches!(self, ErrorCode::UnknownTopicOrPartition)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::None => write!(f, "NONE"),
            ErrorCode::UnknownTopicOrPartition => write!(f, "UNKNOWN_TOPIC_OR_PARTITION"),
            ErrorCode::UnsupportedVersion => write!(f, "UNSUPPORTED_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::None.code(), 0);
        assert_eq!(ErrorCode::UnknownTopicOrPartition.code(), 3);
        assert_eq!(ErrorCode::UnsupportedVersion.code(), 35);
    }

    #[test]
    fn test_error_code_from_code() {
        assert_eq!(ErrorCode::from_code(0), Some(ErrorCode::None));
        assert_eq!(
            ErrorCode::from_code(3),
            Some(ErrorCode::UnknownTopicOrPartition)
        );
        assert_eq!(ErrorCode::from_code(35), Some(ErrorCode::UnsupportedVersion));
        assert_eq!(ErrorCode::from_code(-1), None);
        assert_eq!(ErrorCode::from_code(36), None);
    }

    #[test]
    fn test_error_code_retriable() {
        assert!(ErrorCode::UnknownTopicOrPartition.is_retriable());
        assert!(!ErrorCode::UnsupportedVersion.is_retriable());
        assert!(!ErrorCode::None.is_retriable());
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::None), "NONE");
        assert_eq!(
            format!("{}", ErrorCode::UnknownTopicOrPartition),
            "UNKNOWN_TOPIC_OR_PARTITION"
        );
        assert_eq!(
            format!("{}", ErrorCode::UnsupportedVersion),
            "UNSUPPORTED_VERSION"
        );
    }

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::Truncated {
            needed: 16,
            remaining: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains('3'));

        let err = ProtocolError::invalid("null compact string");
        assert!(err.to_string().contains("null compact string"));

        let err = ProtocolError::UnsupportedApiKey(99);
        assert!(err.to_string().contains("99"));

        let err = ProtocolError::FrameTooLarge { size: 100, max: 50 };
        assert!(err.to_string().contains("100"));
    }
}
