//! Error types for the relay

use std::fmt;
use std::time::Duration;

use mcp_protocol::ParseError;
use thiserror::Error;

/// Kind of panel control an index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// `S` record, indexes the switch key table
    Switch,
    /// `B` record, indexes the button key table
    Button,
    /// `E` record, indexes the dataref table
    Encoder,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Switch => write!(f, "switch"),
            Control::Button => write!(f, "button"),
            Control::Encoder => write!(f, "encoder"),
        }
    }
}

/// Errors talking to the simulator
#[derive(Debug, Error)]
pub enum LinkError {
    /// Socket error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No datagram arrived in time
    #[error("no response from simulator within {0:?}")]
    Timeout(Duration),

    /// Datagram could not be decoded
    #[error("bad response: {0}")]
    Decode(#[from] ParseError),

    /// Index has no entry in the dataref table
    #[error("no dataref at index {0}")]
    UnknownDataref(usize),

    /// Response decoded but carried no records
    #[error("response carried no dataref values")]
    EmptyResponse,
}

/// Synthetic key press could not be delivered
#[derive(Debug, Error)]
#[error("key injection failed for {key:?}: {reason}")]
pub struct InjectError {
    pub key: char,
    pub reason: String,
}

/// Errors that can occur while relaying a panel record
#[derive(Debug, Error)]
pub enum RelayError {
    /// Serial port read or write failed
    #[error("serial I/O error: {0}")]
    Serial(std::io::Error),

    /// Malformed panel record
    #[error("malformed record: {0}")]
    Parse(#[from] ParseError),

    /// Index outside its lookup table
    #[error("{control} index {index} out of range (table has {len} entries)")]
    OutOfRange {
        control: Control,
        index: usize,
        len: usize,
    },

    /// Simulator link error
    #[error("simulator link: {0}")]
    Link(#[from] LinkError),

    /// Key injection error
    #[error(transparent)]
    Inject(#[from] InjectError),
}

impl RelayError {
    /// Whether the relay loop cannot continue after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, RelayError::Serial(_))
    }
}
