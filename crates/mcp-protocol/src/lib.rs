//! B737 MCP Protocol Library
//!
//! This crate provides parsing and encoding for the two links of the
//! B737 Mode Control Panel bridge:
//!
//! - **Panel serial link**: newline-terminated ASCII records from the
//!   hardware (`S<d>` switch, `B<dd>` button, `E<d><float>` encoder) and
//!   float values written back to it
//! - **X-Plane UDP**: fixed-size little-endian `DREF` (set dataref) and
//!   `RREF` (subscribe to dataref) packets, and `RREF` responses carrying
//!   `(index, value)` records
//!
//! Neither module performs I/O. The relay crate owns the serial port and
//! the UDP socket and feeds bytes through these codecs.
//!
//! # Example
//!
//! ```rust
//! use mcp_protocol::{LineCodec, PanelEvent, ProtocolCodec};
//!
//! let mut codec = LineCodec::new();
//! codec.push_bytes(b"E4-1.5\r\n");
//!
//! let line = codec.next_command().unwrap();
//! let event = PanelEvent::parse_line(&line).unwrap();
//! assert_eq!(event, Some(PanelEvent::Encoder { index: 4, delta: -1.5 }));
//! ```

pub mod error;
pub mod layout;
pub mod panel;
pub mod xplane;

pub use error::ParseError;
pub use layout::{PanelLayout, BUTTON_KEYS, DATAREFS, SWITCH_KEYS};
pub use panel::{encode_value, LineCodec, PanelEvent};
pub use xplane::{decode_response, first_value, DatarefRequest, DatarefValue};

/// Trait for codecs that parse incoming byte streams into records
pub trait ProtocolCodec {
    /// The record type produced by this codec
    type Command;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete record from the buffer
    fn next_command(&mut self) -> Option<Self::Command>;

    /// Clear the internal buffer
    fn clear(&mut self);
}

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}
