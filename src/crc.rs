//! Incremental CRC8 and CRC16 accumulators.
//!
//! Both implement [`ByteSink`], so a checksum is computed by routing the same
//! bytes through them that are serialized for real — no second buffer, no
//! separate encode pass.
//!
//! Polynomial selection (Koopman tables):
//! - CRC8 poly `0x37`, init `0x42`: detects up to 5 flipped bits in payloads
//!   of at most 4 bytes — used for the short fixed headers.
//! - CRC16 poly `0x3d65` (CRC-16-DNP family): detects up to 5 flipped bits in
//!   payloads of up to 135 bytes. Seeded with the protocol version for
//!   message checksums and the schema fingerprint, so a version mismatch
//!   reliably breaks verification.
//!
//! Bit order is MSB-first, non-reflected, no final XOR.

use crate::error::Result;
use crate::sink::ByteSink;

pub const CRC8_POLYNOMIAL: u8 = 0x37;
pub const CRC8_INIT: u8 = 0x42;

/// Payload size (bytes) up to which CRC8 retains its error-detection bound.
pub const CRC8_BLOCKSIZE: usize = 4;

pub const CRC16_POLYNOMIAL: u16 = 0x3d65;
pub const CRC16_INIT: u16 = 0x1337;

/// Payload size (bytes) up to which CRC16 retains its error-detection bound.
pub const CRC16_BLOCKSIZE: usize = 135;

// ── CRC8 ─────────────────────────────────────────────────────

/// Incremental CRC8 accumulator.
#[derive(Debug, Clone, Copy)]
pub struct Crc8 {
    state: u8,
}

impl Crc8 {
    pub fn new(init: u8) -> Self {
        Self { state: init }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte;
            for _ in 0..8 {
                self.state = if self.state & 0x80 != 0 {
                    (self.state << 1) ^ CRC8_POLYNOMIAL
                } else {
                    self.state << 1
                };
            }
        }
    }

    /// Running checksum value.
    pub fn value(&self) -> u8 {
        self.state
    }
}

impl ByteSink for Crc8 {
    fn accept(&mut self, bytes: &[u8]) -> Result<usize> {
        self.update(bytes);
        Ok(bytes.len())
    }

    fn remaining_capacity(&self) -> Option<usize> {
        None
    }
}

/// One-shot CRC8 over a byte run.
pub fn crc8(init: u8, bytes: &[u8]) -> u8 {
    let mut crc = Crc8::new(init);
    crc.update(bytes);
    crc.value()
}

// ── CRC16 ────────────────────────────────────────────────────

/// Incremental CRC16 accumulator.
#[derive(Debug, Clone, Copy)]
pub struct Crc16 {
    state: u16,
}

impl Crc16 {
    pub fn new(init: u16) -> Self {
        Self { state: init }
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u16::from(byte) << 8;
            for _ in 0..8 {
                self.state = if self.state & 0x8000 != 0 {
                    (self.state << 1) ^ CRC16_POLYNOMIAL
                } else {
                    self.state << 1
                };
            }
        }
    }

    /// Running checksum value.
    pub fn value(&self) -> u16 {
        self.state
    }
}

impl ByteSink for Crc16 {
    fn accept(&mut self, bytes: &[u8]) -> Result<usize> {
        self.update(bytes);
        Ok(bytes.len())
    }

    fn remaining_capacity(&self) -> Option<usize> {
        None
    }
}

/// One-shot CRC16 over a byte run.
pub fn crc16(init: u16, bytes: &[u8]) -> u16 {
    let mut crc = Crc16::new(init);
    crc.update(bytes);
    crc.value()
}

// ── Tests ────────────────────────────────────────────────────
