//! Scalar property endpoints backed by shared value cells.
//!
//! The owning application keeps a [`ValueCell`] clone and reads/writes it
//! directly; the endpoint holds another clone and serves remote access. This
//! replaces raw pointers into owning objects with handles whose backing
//! storage lives as long as the last clone, so the published table can never
//! dangle.

use core::fmt::Write as _;
use core::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::codec::{MAX_VALUE_WIDTH, WireValue};
use crate::endpoint::{Access, Endpoint, TextAccess};
use crate::error::Result;
use crate::sink::{ByteSink, FmtSink};

/// Shared storage for one property value.
///
/// Each cell is individually locked; the engine adds no synchronization
/// across cells, so multi-value consistency is the application's concern.
#[derive(Debug, Default)]
pub struct ValueCell<T: WireValue>(Arc<RwLock<T>>);

impl<T: WireValue> ValueCell<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn get(&self) -> T {
        match self.0.read() {
            Ok(guard) => *guard,
            // A poisoned lock only means a writer panicked mid-store of a
            // Copy value; the value itself is still whole.
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, value: T) {
        match self.0.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
    }
}

impl<T: WireValue> Clone for ValueCell<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// A named scalar endpoint over a [`ValueCell`].
pub struct Property<T: WireValue> {
    name: String,
    cell: ValueCell<T>,
    access: Access,
}

impl<T: WireValue> Property<T> {
    pub fn read_write(name: impl Into<String>, cell: ValueCell<T>) -> Self {
        Self {
            name: name.into(),
            cell,
            access: Access::ReadWrite,
        }
    }

    pub fn read_only(name: impl Into<String>, cell: ValueCell<T>) -> Self {
        Self {
            name: name.into(),
            cell,
            access: Access::ReadOnly,
        }
    }

    pub fn access(&self) -> Access {
        self.access
    }
}

impl<T> Endpoint for Property<T>
where
    T: WireValue + core::fmt::Display + FromStr,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self, id: usize, out: &mut dyn ByteSink) -> Result<()> {
        let mut w = FmtSink::new(out);
        let _ = write!(
            w,
            "{{\"name\":\"{}\",\"id\":{},\"type\":\"{}\",\"access\":\"{}\"}}",
            self.name,
            id,
            T::TYPE.name(),
            self.access.as_str(),
        );
        w.finish()
    }

    fn handle(&self, input: &[u8], output: Option<&mut dyn ByteSink>) {
        // Old value is always streamed before the new one is committed, so a
        // polling caller can read-then-write atomically in one request.
        if let Some(out) = output {
            let mut buf = [0u8; MAX_VALUE_WIDTH];
            let n = self.cell.get().write_le(&mut buf);
            // Insufficient capacity: write nothing at all, not a prefix.
            if out.remaining_capacity().is_none_or(|free| free >= n) {
                let _ = out.accept(&buf[..n]);
            }
        }

        if self.access == Access::ReadWrite && input.len() >= T::TYPE.width() {
            self.cell.set(T::read_le(input));
        }
    }

    fn text(&self) -> Option<&dyn TextAccess> {
        Some(self)
    }
}

impl<T> TextAccess for Property<T>
where
    T: WireValue + core::fmt::Display + FromStr,
{
    fn get_text(&self) -> Option<String> {
        Some(self.cell.get().to_string())
    }

    fn set_text(&self, text: &str) -> bool {
        if self.access != Access::ReadWrite {
            return false;
        }
        match text.trim().parse::<T>() {
            Ok(value) => {
                self.cell.set(value);
                true
            }
            Err(_) => false,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
