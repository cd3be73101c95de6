//! Bounded byte-sink abstraction.
//!
//! Everything that consumes serialized bytes — transmit buffers, checksum
//! accumulators, JSON emission — goes through the same [`ByteSink`] contract,
//! so a value can be "written" to a CRC engine with the exact byte sequence
//! that a real encode would produce, with zero extra buffering.

use core::fmt;

use crate::error::{Error, Result};

/// A byte consumer with a finite or unbounded capacity.
///
/// Producers must stop writing as soon as capacity is exhausted; a sink may
/// accept fewer bytes than offered. `remaining_capacity()` of `None` means
/// the sink never refuses.
pub trait ByteSink {
    /// Consume up to `bytes.len()` bytes. Returns the count actually accepted.
    fn accept(&mut self, bytes: &[u8]) -> Result<usize>;

    /// Free space left in the sink, or `None` if unbounded.
    fn remaining_capacity(&self) -> Option<usize>;
}

/// Write an entire string to a sink, failing with `SinkFull` on truncation.
pub(crate) fn write_all(out: &mut dyn ByteSink, bytes: &[u8]) -> Result<()> {
    let n = out.accept(bytes)?;
    if n < bytes.len() {
        return Err(Error::SinkFull);
    }
    Ok(())
}

// ── Slice-backed bounded sink ────────────────────────────────

/// Bounded sink writing into a caller-provided byte slice.
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The filled prefix of the backing slice.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl ByteSink for SliceSink<'_> {
    fn accept(&mut self, bytes: &[u8]) -> Result<usize> {
        let free = self.buf.len() - self.len;
        let n = bytes.len().min(free);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        Ok(n)
    }

    fn remaining_capacity(&self) -> Option<usize> {
        Some(self.buf.len() - self.len)
    }
}

// ── Offset-skipping adapter ──────────────────────────────────

/// Discards the first `skip` bytes, then forwards to the inner sink.
///
/// Used for chunked schema reads: the client passes a byte offset and the
/// descriptor endpoint streams the full document through this adapter.
pub struct OffsetSink<'a> {
    inner: &'a mut dyn ByteSink,
    skip: usize,
}

impl<'a> OffsetSink<'a> {
    pub fn new(inner: &'a mut dyn ByteSink, skip: usize) -> Self {
        Self { inner, skip }
    }
}

impl ByteSink for OffsetSink<'_> {
    fn accept(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.skip >= bytes.len() {
            self.skip -= bytes.len();
            return Ok(bytes.len());
        }
        let skipped = self.skip;
        self.skip = 0;
        let n = self.inner.accept(&bytes[skipped..])?;
        Ok(skipped + n)
    }

    fn remaining_capacity(&self) -> Option<usize> {
        self.inner
            .remaining_capacity()
            .map(|c| c.saturating_add(self.skip))
    }
}

// ── fmt::Write adapter ───────────────────────────────────────

/// Adapts a [`ByteSink`] to `core::fmt::Write` so JSON fragments can be
/// streamed with `write!`. The first sink error is latched and re-raised by
/// [`FmtSink::finish`], since `fmt::Error` carries no detail.
pub struct FmtSink<'a> {
    inner: &'a mut dyn ByteSink,
    err: Option<Error>,
}

impl<'a> FmtSink<'a> {
    pub fn new(inner: &'a mut dyn ByteSink) -> Self {
        Self { inner, err: None }
    }

    /// Surface the latched sink error, if any.
    pub fn finish(self) -> Result<()> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Write for FmtSink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.err.is_some() {
            return Err(fmt::Error);
        }
        match write_all(self.inner, s.as_bytes()) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.err = Some(e);
                Err(fmt::Error)
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
