//! Panel Serial Protocol
//!
//! The MCP firmware reports every control change as one ASCII line.
//!
//! # Format
//! - `S<d>\n` - switch `<d>` toggled (single digit)
//! - `B<dd..>\n` - push-button `<dd..>` pressed (one or more digits)
//! - `E<d><float>\n` - encoder `<d>` turned by `<float>` (signed)
//!
//! A `\r` before the newline is tolerated. Lines with any other prefix are
//! ignored. In the other direction the host writes a bare float, without a
//! terminator, when the panel asked for a dataref read-back. That float is
//! the shortest text that reads back as the same `f32`; it is not widened to
//! `f64` first, so 29.92 goes out as `29.92` and not `29.920000076293945`.

use tracing::{trace, warn};

use crate::error::ParseError;
use crate::{EncodeCommand, ProtocolCodec};

/// Maximum line length (reasonable limit to prevent buffer overflow)
const MAX_LINE_LEN: usize = 256;

/// A single control event reported by the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    /// Toggle switch changed state: `S3`
    Switch(usize),
    /// Push-button pressed: `B10`
    Button(usize),
    /// Rotary encoder moved: `E4-1.5`
    Encoder {
        /// Encoder number, also the dataref table index
        index: usize,
        /// Relative movement
        delta: f32,
    },
}

impl PanelEvent {
    /// Parse one line (terminator optional) into an event
    ///
    /// Returns `Ok(None)` for blank lines and unknown prefixes.
    pub fn parse_line(line: &[u8]) -> Result<Option<Self>, ParseError> {
        let text =
            std::str::from_utf8(line).map_err(|_| ParseError::InvalidUtf8(line.to_vec()))?;
        let text = text.trim();

        let Some(prefix) = text.chars().next() else {
            return Ok(None);
        };

        match prefix {
            'S' => Self::parse_digit(&text[1..]).map(|index| Some(PanelEvent::Switch(index))),
            'B' => {
                let params = &text[1..];
                if params.is_empty() {
                    return Err(ParseError::MissingIndex);
                }
                let index = params
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidIndex(params.into()))?;
                Ok(Some(PanelEvent::Button(index)))
            }
            'E' => {
                let params = &text[1..];
                let index = Self::parse_digit(params)?;
                // index is one ASCII digit, so the delta starts at byte 1
                let delta_str = &params[1..];
                let delta = delta_str
                    .parse::<f32>()
                    .ok()
                    .filter(|d| d.is_finite())
                    .ok_or_else(|| ParseError::InvalidDelta(delta_str.into()))?;
                Ok(Some(PanelEvent::Encoder { index, delta }))
            }
            _ => {
                trace!("Ignoring panel line {:?}", text);
                Ok(None)
            }
        }
    }

    /// Parse the single-digit index at the start of `params`
    fn parse_digit(params: &str) -> Result<usize, ParseError> {
        let c = params.chars().next().ok_or(ParseError::MissingIndex)?;
        c.to_digit(10)
            .map(|d| d as usize)
            .ok_or_else(|| ParseError::InvalidIndex(c.to_string()))
    }
}

impl EncodeCommand for PanelEvent {
    fn encode(&self) -> Vec<u8> {
        let s = match self {
            PanelEvent::Switch(index) => format!("S{}\n", index),
            PanelEvent::Button(index) => format!("B{}\n", index),
            PanelEvent::Encoder { index, delta } => format!("E{}{:?}\n", index, delta),
        };
        s.into_bytes()
    }
}

/// Render a dataref value as the text written back to the panel
///
/// Always carries a decimal point (`1500.0`, `-0.5`). Formatted from the
/// `f32` itself, never from its `f64` widening.
pub fn encode_value(value: f32) -> Vec<u8> {
    format!("{:?}", value).into_bytes()
}

/// Streaming splitter for newline-terminated panel records
///
/// Partial lines stay buffered until their newline arrives, so a read
/// timeout in the middle of a record does not corrupt it.
pub struct LineCodec {
    buffer: Vec<u8>,
}

impl LineCodec {
    /// Create a new line codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(MAX_LINE_LEN),
        }
    }

    /// Number of bytes waiting for a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for LineCodec {
    type Command = Vec<u8>;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        if self.buffer.len() > MAX_LINE_LEN && !self.buffer.contains(&b'\n') {
            warn!(
                "Discarding {} bytes of unterminated panel input",
                self.buffer.len()
            );
            self.buffer.clear();
        }
    }

    fn next_command(&mut self) -> Option<Vec<u8>> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{encode_value, LineCodec, PanelEvent};
    use crate::error::ParseError;
    use crate::{EncodeCommand, ProtocolCodec};

    #[test]
    fn test_parse_switch() {
        assert_eq!(
            PanelEvent::parse_line(b"S3\n"),
            Ok(Some(PanelEvent::Switch(3)))
        );
    }

    #[test]
    fn test_parse_switch_reads_single_digit() {
        assert_eq!(
            PanelEvent::parse_line(b"S12"),
            Ok(Some(PanelEvent::Switch(1)))
        );
    }

    #[test]
    fn test_parse_button_multi_digit() {
        assert_eq!(
            PanelEvent::parse_line(b"B10\r\n"),
            Ok(Some(PanelEvent::Button(10)))
        );
        assert_eq!(
            PanelEvent::parse_line(b"B7"),
            Ok(Some(PanelEvent::Button(7)))
        );
    }

    #[test]
    fn test_parse_encoder() {
        assert_eq!(
            PanelEvent::parse_line(b"E4-1.5\n"),
            Ok(Some(PanelEvent::Encoder {
                index: 4,
                delta: -1.5
            }))
        );
        assert_eq!(
            PanelEvent::parse_line(b"E01"),
            Ok(Some(PanelEvent::Encoder {
                index: 0,
                delta: 1.0
            }))
        );
    }

    #[test]
    fn test_parse_blank_and_unknown() {
        assert_eq!(PanelEvent::parse_line(b""), Ok(None));
        assert_eq!(PanelEvent::parse_line(b"\r\n"), Ok(None));
        assert_eq!(PanelEvent::parse_line(b"READY"), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PanelEvent::parse_line(&[b'S', 0xFF, b'\n']),
            Err(ParseError::InvalidUtf8(vec![b'S', 0xFF, b'\n']))
        );
        assert_eq!(PanelEvent::parse_line(b"S"), Err(ParseError::MissingIndex));
        assert_eq!(PanelEvent::parse_line(b"B"), Err(ParseError::MissingIndex));
        assert_eq!(
            PanelEvent::parse_line(b"Sx"),
            Err(ParseError::InvalidIndex("x".into()))
        );
        assert_eq!(
            PanelEvent::parse_line(b"B1a"),
            Err(ParseError::InvalidIndex("1a".into()))
        );
        assert_eq!(
            PanelEvent::parse_line(b"E2"),
            Err(ParseError::InvalidDelta("".into()))
        );
        assert_eq!(
            PanelEvent::parse_line(b"E2abc"),
            Err(ParseError::InvalidDelta("abc".into()))
        );
        assert_eq!(
            PanelEvent::parse_line(b"E2inf"),
            Err(ParseError::InvalidDelta("inf".into()))
        );
    }

    #[test]
    fn test_encode_events() {
        assert_eq!(PanelEvent::Switch(3).encode(), b"S3\n");
        assert_eq!(PanelEvent::Button(10).encode(), b"B10\n");
        assert_eq!(
            PanelEvent::Encoder {
                index: 4,
                delta: -1.5
            }
            .encode(),
            b"E4-1.5\n"
        );
    }

    #[test]
    fn test_encoded_encoder_parses_back() {
        let event = PanelEvent::Encoder {
            index: 2,
            delta: 5.0,
        };
        assert_eq!(PanelEvent::parse_line(&event.encode()), Ok(Some(event)));
    }

    #[test]
    fn test_encode_value() {
        assert_eq!(encode_value(1500.0), b"1500.0");
        assert_eq!(encode_value(-0.5), b"-0.5");
        assert_eq!(encode_value(29.92), b"29.92");
    }

    #[test]
    fn test_streaming_lines() {
        let mut codec = LineCodec::new();

        codec.push_bytes(b"E4-1");
        assert!(codec.next_command().is_none());
        assert_eq!(codec.pending(), 4);

        codec.push_bytes(b".5\r\nS3\nB1");
        assert_eq!(codec.next_command(), Some(b"E4-1.5".to_vec()));
        assert_eq!(codec.next_command(), Some(b"S3".to_vec()));
        assert!(codec.next_command().is_none());

        codec.push_bytes(b"0\n");
        assert_eq!(codec.next_command(), Some(b"B10".to_vec()));
    }

    #[test]
    fn test_overlong_line_discarded() {
        let mut codec = LineCodec::new();
        codec.push_bytes(&[b'A'; 300]);
        assert_eq!(codec.pending(), 0);

        codec.push_bytes(b"S1\n");
        assert_eq!(codec.next_command(), Some(b"S1".to_vec()));
    }

    #[test]
    fn test_clear() {
        let mut codec = LineCodec::new();
        codec.push_bytes(b"B1");
        codec.clear();
        codec.push_bytes(b"2\n");
        assert_eq!(codec.next_command(), Some(b"2".to_vec()));
    }
}
