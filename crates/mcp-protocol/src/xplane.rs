//! X-Plane Dataref UDP Protocol
//!
//! X-Plane listens for fixed-size binary packets on its UDP port. All
//! integer and float fields are little-endian. Strings are null padded to
//! a fixed field width and truncated if longer.
//!
//! # Set dataref (`DREF`, 509 bytes)
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 5 | `DREF\0` |
//! | 5 | 4 | value, f32 |
//! | 9 | 500 | dataref path |
//!
//! # Subscribe to dataref (`RREF`, 413 bytes)
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 5 | `RREF\0` |
//! | 5 | 4 | frequency (reports per second, 0 = stop), i32 |
//! | 9 | 4 | subscription index, i32 |
//! | 13 | 400 | dataref path |
//!
//! # Subscription response
//! A 5-byte header followed by any number of 8-byte records, each an i32
//! subscription index and an f32 value.

use crate::error::ParseError;
use crate::EncodeCommand;

/// Command tag of a set-dataref packet
pub const DREF_TAG: &[u8; 5] = b"DREF\0";
/// Command tag of a subscribe packet
pub const RREF_TAG: &[u8; 5] = b"RREF\0";

/// Length of a command tag or response header
pub const HEADER_LEN: usize = 5;
/// Path field width in a set-dataref packet
pub const DREF_PATH_LEN: usize = 500;
/// Path field width in a subscribe packet
pub const RREF_PATH_LEN: usize = 400;
/// Total size of a set-dataref packet
pub const DREF_PACKET_LEN: usize = HEADER_LEN + 4 + DREF_PATH_LEN;
/// Total size of a subscribe packet
pub const RREF_PACKET_LEN: usize = HEADER_LEN + 4 + 4 + RREF_PATH_LEN;
/// Size of one `(index, value)` response record
pub const RECORD_LEN: usize = 8;

/// Outbound request to the simulator
#[derive(Debug, Clone, PartialEq)]
pub enum DatarefRequest {
    /// Write a value to a dataref
    Set {
        /// Dataref path
        path: String,
        /// New value
        value: f32,
    },
    /// Start (frequency > 0) or stop (frequency 0) periodic reports
    Subscribe {
        /// Dataref path
        path: String,
        /// Reports per second
        frequency: i32,
        /// Index echoed back in each response record
        index: i32,
    },
}

impl DatarefRequest {
    /// Build a set-dataref request
    pub fn set(path: impl Into<String>, value: f32) -> Self {
        Self::Set {
            path: path.into(),
            value,
        }
    }

    /// Build a subscribe request
    pub fn subscribe(path: impl Into<String>, frequency: i32, index: i32) -> Self {
        Self::Subscribe {
            path: path.into(),
            frequency,
            index,
        }
    }

    /// Build a request cancelling a subscription
    pub fn unsubscribe(path: impl Into<String>, index: i32) -> Self {
        Self::subscribe(path, 0, index)
    }

    /// Parse a packet produced by [`EncodeCommand::encode`]
    pub fn decode(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < HEADER_LEN {
            return Err(ParseError::Truncated {
                needed: HEADER_LEN,
                got: data.len(),
            });
        }

        match &data[..HEADER_LEN] {
            tag if tag == DREF_TAG => {
                check_len(data, DREF_PACKET_LEN)?;
                Ok(Self::Set {
                    value: read_f32(data, 5),
                    path: read_path(&data[9..]),
                })
            }
            tag if tag == RREF_TAG => {
                check_len(data, RREF_PACKET_LEN)?;
                Ok(Self::Subscribe {
                    frequency: read_i32(data, 5),
                    index: read_i32(data, 9),
                    path: read_path(&data[13..]),
                })
            }
            tag => Err(ParseError::UnknownTag(tag.to_vec())),
        }
    }

    /// Dataref path this request refers to
    pub fn path(&self) -> &str {
        match self {
            Self::Set { path, .. } | Self::Subscribe { path, .. } => path,
        }
    }
}

impl EncodeCommand for DatarefRequest {
    /// Encode to the fixed-size wire packet
    ///
    /// # Panics
    /// If the packet does not come out at its fixed size.
    fn encode(&self) -> Vec<u8> {
        match self {
            Self::Set { path, value } => {
                let mut buf = Vec::with_capacity(DREF_PACKET_LEN);
                buf.extend_from_slice(DREF_TAG);
                buf.extend_from_slice(&value.to_le_bytes());
                write_path(&mut buf, path, DREF_PATH_LEN);
                assert_eq!(buf.len(), DREF_PACKET_LEN, "DREF packet size");
                buf
            }
            Self::Subscribe {
                path,
                frequency,
                index,
            } => {
                let mut buf = Vec::with_capacity(RREF_PACKET_LEN);
                buf.extend_from_slice(RREF_TAG);
                buf.extend_from_slice(&frequency.to_le_bytes());
                buf.extend_from_slice(&index.to_le_bytes());
                write_path(&mut buf, path, RREF_PATH_LEN);
                assert_eq!(buf.len(), RREF_PACKET_LEN, "RREF packet size");
                buf
            }
        }
    }
}

/// One record of a subscription response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatarefValue {
    /// Subscription index given in the request
    pub index: i32,
    /// Current dataref value
    pub value: f32,
}

impl DatarefValue {
    /// Encode as an 8-byte response record
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[..4].copy_from_slice(&self.index.to_le_bytes());
        out[4..].copy_from_slice(&self.value.to_le_bytes());
        out
    }
}

/// Decode every record of a subscription response
///
/// Trailing bytes that do not fill a whole record are ignored.
pub fn decode_response(data: &[u8]) -> Result<Vec<DatarefValue>, ParseError> {
    if data.len() < HEADER_LEN {
        return Err(ParseError::Truncated {
            needed: HEADER_LEN,
            got: data.len(),
        });
    }

    Ok(data[HEADER_LEN..]
        .chunks_exact(RECORD_LEN)
        .map(|record| DatarefValue {
            index: read_i32(record, 0),
            value: read_f32(record, 4),
        })
        .collect())
}

/// Value of the first record of a subscription response
pub fn first_value(data: &[u8]) -> Result<Option<f32>, ParseError> {
    decode_response(data).map(|values| values.first().map(|v| v.value))
}

fn check_len(data: &[u8], needed: usize) -> Result<(), ParseError> {
    if data.len() < needed {
        return Err(ParseError::Truncated {
            needed,
            got: data.len(),
        });
    }
    Ok(())
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    f32::from_le_bytes(bytes)
}

/// Append `path` as a null-padded field of exactly `width` bytes
fn write_path(buf: &mut Vec<u8>, path: &str, width: usize) {
    let bytes = path.as_bytes();
    let n = bytes.len().min(width);
    buf.extend_from_slice(&bytes[..n]);
    buf.resize(buf.len() + (width - n), 0);
}

fn read_path(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
