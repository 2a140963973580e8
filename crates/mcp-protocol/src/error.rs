//! Error types for panel and X-Plane protocol parsing

use thiserror::Error;

/// Errors that can occur while parsing panel lines or X-Plane packets
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Serial line is not valid UTF-8
    #[error("line is not valid UTF-8: {0:02X?}")]
    InvalidUtf8(Vec<u8>),

    /// Record prefix present but no index followed it
    #[error("record has no index")]
    MissingIndex,

    /// Index characters are not a non-negative integer
    #[error("invalid index: {0:?}")]
    InvalidIndex(String),

    /// Encoder delta is not a float
    #[error("invalid encoder delta: {0:?}")]
    InvalidDelta(String),

    /// Packet shorter than its fixed layout
    #[error("truncated packet: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    /// Packet tag is neither DREF nor RREF
    #[error("unknown packet tag: {0:02X?}")]
    UnknownTag(Vec<u8>),
}
