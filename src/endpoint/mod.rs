//! Endpoint abstraction — the polymorphic unit of the published tree.
//!
//! Three variants share one trait:
//!
//! - [`property::Property`] — a cell-backed scalar, read-only or read-write
//! - [`function::Function`] — a bound callable with nested argument endpoints
//! - [`schema::SchemaDescriptor`] — the singleton id-0 meta endpoint whose
//!   "value" is the serialized JSON description of the whole tree
//!
//! Every endpoint knows how to describe itself in the schema and how to
//! handle a dispatched request. Dispatch never fails across this boundary:
//! insufficient output capacity or input bytes degrade to a no-op.

pub mod function;
pub mod property;
pub mod schema;

use std::sync::Arc;

use crate::error::Result;
use crate::sink::ByteSink;

/// Access mode of a property as advertised in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    ReadWrite,
}

impl Access {
    /// Schema string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "r",
            Self::ReadWrite => "rw",
        }
    }
}

/// An addressable node in the published endpoint table.
///
/// `Send + Sync` because the published table is shared read-only across
/// channel threads; per-value synchronization lives in the property cells.
pub trait Endpoint: Send + Sync {
    /// Declared member name ("" for the schema descriptor).
    fn name(&self) -> &str;

    /// Nested endpoints occupying the ids immediately after this one
    /// (a function's inputs then outputs; empty for leaves).
    fn children(&self) -> &[Arc<dyn Endpoint>] {
        &[]
    }

    /// Ids occupied by this endpoint including nested children.
    ///
    /// Known without traversing subtrees on the dispatch path; the composer
    /// uses it to pre-allocate contiguous id ranges in a single pass.
    fn endpoint_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|c| c.endpoint_count())
            .sum::<usize>()
    }

    /// Emit this endpoint's JSON schema fragment, given its assigned id.
    fn describe(&self, id: usize, out: &mut dyn ByteSink) -> Result<()>;

    /// Apply an inbound payload and optionally stream output bytes.
    ///
    /// Properties stream the old value first (skipped when the sink lacks
    /// capacity), then commit a new value if at least the type's width of
    /// input bytes was supplied. Functions invoke their bound callable.
    fn handle(&self, input: &[u8], output: Option<&mut dyn ByteSink>);

    /// Legacy text get/set capability, where supported.
    ///
    /// Kept out of the core wire protocol: only the text console consumer
    /// uses this, via name resolution rather than endpoint ids.
    fn text(&self) -> Option<&dyn TextAccess> {
        None
    }
}

/// Optional text accessor for the legacy ASCII get/set protocol.
pub trait TextAccess {
    /// Format the current value as text.
    fn get_text(&self) -> Option<String>;

    /// Parse `text` and store it. Returns false if unsupported or unparseable.
    fn set_text(&self, text: &str) -> bool;
}
