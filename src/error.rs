//! Unified error types for the protocol engine.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! channel's drop handling uniform. All variants are `Copy` so they can be
//! cheaply passed through the dispatch path without allocation.
//!
//! None of these cross the endpoint dispatch boundary: a failed request
//! surfaces as "no response" on the wire, and the typed variant only reaches
//! the local caller (and the log).

use core::fmt;

/// Every fallible operation in the engine funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Packet too short to contain the framed header and checksum.
    PacketTooShort { len: usize },
    /// First byte is not the canonical packet prefix.
    BadPrefix { got: u8 },
    /// Packet length falls between the CRC8 and CRC16 size classes.
    AmbiguousLength { len: usize },
    /// Payload exceeds the CRC16 protection class limit.
    PacketTooLong { len: usize },
    /// Trailing checksum did not match the computed value.
    ChecksumMismatch,
    /// Endpoint id outside the published table.
    UnknownEndpoint { id: u16 },
    /// A bounded sink refused bytes (capacity exhausted).
    SinkFull,
    /// The packet sink could not transmit the framed response.
    SendFailed,
    /// Sequence number rejected by an exchange's ordering window.
    StaleSequence { expected: u16, got: u16 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PacketTooShort { len } => write!(f, "packet too short ({len} bytes)"),
            Self::BadPrefix { got } => write!(f, "bad packet prefix (0x{got:02X})"),
            Self::AmbiguousLength { len } => {
                write!(f, "packet length {len} fits no checksum size class")
            }
            Self::PacketTooLong { len } => write!(f, "packet too long ({len} bytes)"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::UnknownEndpoint { id } => write!(f, "unknown endpoint id {id}"),
            Self::SinkFull => write!(f, "sink capacity exhausted"),
            Self::SendFailed => write!(f, "packet sink send failed"),
            Self::StaleSequence { expected, got } => {
                write!(f, "stale sequence number (expected {expected}, got {got})")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Engine-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
