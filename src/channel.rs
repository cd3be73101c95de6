//! Packet channel — per-packet dispatch against the published table.
//!
//! Wire format (canonical packet form):
//! ```text
//! ┌────────────┬───────────────┬──────────────┬──────────────────┐
//! │ Prefix (1B)│ Endpoint id   │ Payload      │ Checksum         │
//! │ 0xAA       │ LE u16 (2B)   │ 0..=135 B    │ CRC8 or LE CRC16 │
//! └────────────┴───────────────┴──────────────┴──────────────────┘
//! ```
//!
//! CRC8 (init 0x42) protects payloads of at most 4 bytes; larger payloads up
//! to the 135-byte class limit carry a CRC16 seeded with the protocol
//! version. Both cover every byte before the checksum, so stream
//! misalignment, bit errors, and version mismatches all fail verification.
//!
//! Dispatch is a pure function per packet: parse, O(1) table lookup, invoke,
//! frame at most one response. Malformed or unaddressable packets are
//! dropped with a warning — never answered, never propagated as a dispatch
//! failure. Handlers should stay within the advisory
//! [`SERVER_TIMEOUT_MS`] budget; the channel itself never blocks on the
//! transport beyond `send`.

use std::sync::Arc;

use log::{debug, warn};

use crate::codec::WireValue;
use crate::crc::{crc8, crc16, CRC8_BLOCKSIZE, CRC8_INIT, CRC16_BLOCKSIZE};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::sink::SliceSink;
use crate::PROTOCOL_VERSION;

/// Canonical first byte of every packet (stream misalignment detector).
pub const PACKET_PREFIX: u8 = 0xAA;

/// Transmit buffer size: the largest response payload a channel produces.
pub const TX_BUF_SIZE: usize = 128;

/// Advisory upper bound on per-request processing time, in milliseconds.
/// Documented contract for endpoint handlers, not enforced by the channel.
pub const SERVER_TIMEOUT_MS: u32 = 10;

/// Prefix byte plus u16 endpoint id.
const HEADER_SIZE: usize = 1 + 2;

/// Largest total packet length still in the CRC8 size class.
const MAX_CRC8_PACKET: usize = HEADER_SIZE + CRC8_BLOCKSIZE + 1;

/// Smallest total packet length in the CRC16 size class.
const MIN_CRC16_PACKET: usize = HEADER_SIZE + CRC8_BLOCKSIZE + 1 + 2;

/// Largest total packet length (CRC16 class limit).
pub const MAX_PACKET_SIZE: usize = HEADER_SIZE + CRC16_BLOCKSIZE + 2;

/// A framed packet ready for a transport.
pub type Packet = heapless::Vec<u8, MAX_PACKET_SIZE>;

/// Outbound packet-oriented transport.
pub trait PacketSink {
    /// Transmit one packet.
    fn send(&mut self, packet: &[u8]) -> Result<()>;

    /// Largest packet this transport can carry, or `None` if unbounded.
    fn max_packet_size(&self) -> Option<usize>;
}

/// A packet sink that discards everything. Useful as a default when no
/// client is connected.
pub struct NullPacketSink;

impl PacketSink for NullPacketSink {
    fn send(&mut self, _packet: &[u8]) -> Result<()> {
        Ok(())
    }

    fn max_packet_size(&self) -> Option<usize> {
        None
    }
}

/// Frame `payload` addressed to (or answering for) `endpoint_id`.
///
/// Used by the channel for responses and by clients for requests. Returns
/// `None` if the payload exceeds the CRC16 class limit.
pub fn frame_packet(endpoint_id: u16, payload: &[u8]) -> Option<Packet> {
    if payload.len() > CRC16_BLOCKSIZE {
        return None;
    }
    let mut packet = Packet::new();
    let mut id = [0u8; 2];
    endpoint_id.write_le(&mut id);
    let _ = packet.push(PACKET_PREFIX);
    let _ = packet.extend_from_slice(&id);
    let _ = packet.extend_from_slice(payload);
    if payload.len() <= CRC8_BLOCKSIZE {
        let _ = packet.push(crc8(CRC8_INIT, &packet));
    } else {
        let crc = crc16(PROTOCOL_VERSION, &packet);
        let _ = packet.extend_from_slice(&crc.to_le_bytes());
    }
    Some(packet)
}

/// Parse and verify a raw packet; returns `(endpoint_id, payload)`.
fn parse_packet(raw: &[u8]) -> Result<(u16, &[u8])> {
    let len = raw.len();
    if len < HEADER_SIZE + 1 {
        return Err(Error::PacketTooShort { len });
    }
    if len > MAX_PACKET_SIZE {
        return Err(Error::PacketTooLong { len });
    }
    if raw[0] != PACKET_PREFIX {
        return Err(Error::BadPrefix { got: raw[0] });
    }

    // The checksum width follows from the total length: payloads of at most
    // 4 bytes always use CRC8 (total <= 8), larger ones CRC16 (total >= 10).
    // A 9-byte packet fits neither class.
    let payload = if len <= MAX_CRC8_PACKET {
        if crc8(CRC8_INIT, &raw[..len - 1]) != raw[len - 1] {
            return Err(Error::ChecksumMismatch);
        }
        &raw[HEADER_SIZE..len - 1]
    } else if len >= MIN_CRC16_PACKET {
        let body = &raw[..len - 2];
        if crc16(PROTOCOL_VERSION, body) != u16::read_le(&raw[len - 2..]) {
            return Err(Error::ChecksumMismatch);
        }
        &raw[HEADER_SIZE..len - 2]
    } else {
        return Err(Error::AmbiguousLength { len });
    };

    Ok((u16::read_le(&raw[1..3]), payload))
}

/// Handles the communication protocol on one channel.
///
/// Each instance owns its transmit buffer; one packet is handled to
/// completion before the next. Multiple channels (one per transport or
/// connection) may run on independent threads against the same registry.
pub struct PacketChannel {
    registry: Arc<Registry>,
    tx_buf: [u8; TX_BUF_SIZE],
}

impl PacketChannel {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            tx_buf: [0u8; TX_BUF_SIZE],
        }
    }

    /// Dispatch one inbound packet, emitting at most one response on
    /// `output`. The returned error is the local drop reason; nothing is
    /// ever sent back for a bad packet.
    pub fn process_packet(&mut self, raw: &[u8], output: &mut dyn PacketSink) -> Result<()> {
        match self.dispatch(raw, output) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("channel: dropped packet ({e})");
                Err(e)
            }
        }
    }

    fn dispatch(&mut self, raw: &[u8], output: &mut dyn PacketSink) -> Result<()> {
        let (id, payload) = parse_packet(raw)?;
        let endpoint = self
            .registry
            .endpoint(id)
            .map(Arc::clone)
            .ok_or(Error::UnknownEndpoint { id })?;

        // Bound the response payload by our buffer and the transport MTU; a
        // larger response is truncated and the client polls with offsets.
        let budget = match output.max_packet_size() {
            None => TX_BUF_SIZE,
            Some(mtu) => TX_BUF_SIZE.min(mtu.saturating_sub(HEADER_SIZE + 2)),
        };

        let mut tx = SliceSink::new(&mut self.tx_buf[..budget]);
        endpoint.handle(payload, Some(&mut tx));
        let produced = tx.len();
        if produced == 0 {
            debug!("channel: endpoint {id} produced no response");
            return Ok(());
        }

        let response = frame_packet(id, &self.tx_buf[..produced])
            .ok_or(Error::PacketTooLong { len: produced })?;
        output.send(&response)
    }
}

// ── Tests ────────────────────────────────────────────────────
