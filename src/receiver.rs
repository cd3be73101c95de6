//! Per-exchange receiver state for multi-packet request/response exchanges.
//!
//! A logical exchange (payload larger than one physical packet, or any
//! request expecting a response) may span several packets on a transport
//! that reorders or duplicates them. This state tracks one exchange:
//! which endpoint is in play, how much payload is still expected, a thread
//! id distinguishing concurrently open exchanges on one channel, and a
//! wrapping sequence counter.
//!
//! Policy: the window advances one sequence number per in-order packet.
//! With ordering enforced, anything but the exact expected number is
//! rejected (behind as a duplicate, ahead as out of order). With ordering
//! relaxed, ahead packets are applied immediately and the window jumps
//! forward; the skipped numbers stay open in a [`SEEN_WINDOW`]-wide bitmap,
//! so a late first transmission is still applied and only a true replay is
//! suppressed. Teardown — completion, explicit end, or inactivity timeout —
//! is the transport's call; this layer only answers "is the declared length
//! fully received".

use log::debug;

use crate::error::{Error, Result};

/// How far behind the window a late first transmission may still arrive
/// and be applied (relaxed ordering only).
pub const SEEN_WINDOW: u16 = 64;

/// Delivery-control flags for one exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExchangeFlags {
    /// Remote must acknowledge receipt of each packet.
    pub expect_ack: bool,
    /// A response payload is expected back.
    pub expect_response: bool,
    /// Out-of-order packets are rejected instead of applied.
    pub enforce_ordering: bool,
}

/// Verdict on one observed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqOutcome {
    /// Applied; state advanced.
    Accepted,
    /// Already applied (or stale beyond the seen window).
    Duplicate,
    /// Ahead of the window while ordering is enforced.
    OutOfOrder,
}

/// Bookkeeping for one in-flight exchange.
#[derive(Debug, Clone)]
pub struct ExchangeState {
    endpoint_id: u16,
    expected_len: usize,
    received_len: usize,
    thread_id: u16,
    next_seq: u16,
    /// Bit `k` set means sequence number `next_seq - 1 - k` was applied.
    seen: u64,
    flags: ExchangeFlags,
}

impl ExchangeState {
    /// Open an exchange on first packet observation. `first_seq` is the
    /// sequence number the next packet must carry.
    pub fn begin(
        endpoint_id: u16,
        expected_len: usize,
        thread_id: u16,
        first_seq: u16,
        flags: ExchangeFlags,
    ) -> Self {
        Self {
            endpoint_id,
            expected_len,
            received_len: 0,
            thread_id,
            next_seq: first_seq,
            seen: 0,
            flags,
        }
    }

    /// Whether a packet addressed to `(endpoint_id, thread_id)` belongs to
    /// this exchange.
    pub fn matches(&self, endpoint_id: u16, thread_id: u16) -> bool {
        self.endpoint_id == endpoint_id && self.thread_id == thread_id
    }

    /// Judge one packet of `chunk_len` payload bytes carrying `seq`.
    pub fn observe(&mut self, seq: u16, chunk_len: usize) -> SeqOutcome {
        let ahead = seq.wrapping_sub(self.next_seq);
        if ahead == 0 {
            self.advance(1, chunk_len);
            return SeqOutcome::Accepted;
        }
        if ahead <= u16::MAX / 2 {
            if self.flags.enforce_ordering {
                debug!(
                    "receiver: out-of-order seq {seq} on endpoint {} (window at {})",
                    self.endpoint_id, self.next_seq
                );
                return SeqOutcome::OutOfOrder;
            }
            // Ordering relaxed: apply immediately; the window jumps forward
            // and the skipped numbers stay open for late arrival.
            self.advance(u32::from(ahead) + 1, chunk_len);
            return SeqOutcome::Accepted;
        }

        let behind = self.next_seq.wrapping_sub(seq);
        if !self.flags.enforce_ordering
            && behind <= SEEN_WINDOW
            && self.seen & (1u64 << (behind - 1)) == 0
        {
            // First transmission arriving after the window jumped past it.
            self.seen |= 1u64 << (behind - 1);
            self.count(chunk_len);
            return SeqOutcome::Accepted;
        }
        debug!(
            "receiver: duplicate seq {seq} on endpoint {} (window at {})",
            self.endpoint_id, self.next_seq
        );
        SeqOutcome::Duplicate
    }

    /// Like [`observe`](Self::observe), but rejections become typed errors
    /// for `?`-style transports.
    pub fn check(&mut self, seq: u16, chunk_len: usize) -> Result<()> {
        let expected = self.next_seq;
        match self.observe(seq, chunk_len) {
            SeqOutcome::Accepted => Ok(()),
            SeqOutcome::Duplicate | SeqOutcome::OutOfOrder => {
                Err(Error::StaleSequence { expected, got: seq })
            }
        }
    }

    fn advance(&mut self, steps: u32, chunk_len: usize) {
        self.next_seq = self.next_seq.wrapping_add(steps as u16);
        self.seen = if steps >= 64 {
            1
        } else {
            (self.seen << steps) | 1
        };
        self.count(chunk_len);
    }

    fn count(&mut self, chunk_len: usize) {
        self.received_len = self
            .received_len
            .saturating_add(chunk_len)
            .min(self.expected_len);
    }

    /// Declared payload fully received; the exchange can be torn down.
    pub fn is_complete(&self) -> bool {
        self.received_len >= self.expected_len
    }

    /// Payload bytes still outstanding.
    pub fn remaining(&self) -> usize {
        self.expected_len - self.received_len
    }

    pub fn endpoint_id(&self) -> u16 {
        self.endpoint_id
    }

    pub fn flags(&self) -> ExchangeFlags {
        self.flags
    }
}

// ── Tests ────────────────────────────────────────────────────
