//! Object-tree composer.
//!
//! Combines named endpoints and sub-objects into an ordered composite whose
//! total endpoint count is known without traversal, and which can:
//!
//! - emit its combined JSON description (members comma-joined)
//! - resolve a dot-separated path (`"a.b.c"`) to a leaf endpoint
//! - fill a flat table with every member at its assigned id
//!
//! Id assignment is a pre-order depth-first walk of declared members, each
//! member's subtree occupying a contiguous range sized by its endpoint count.
//! Declared order is the sole determinant of ids: reordering members changes
//! every downstream id and therefore the schema fingerprint.

use core::fmt::Write as _;
use std::sync::Arc;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::sink::{write_all, ByteSink, FmtSink};

enum Member {
    Endpoint(Arc<dyn Endpoint>),
    Object { name: String, tree: ObjectTree },
}

impl Member {
    fn endpoint_count(&self) -> usize {
        match self {
            Self::Endpoint(ep) => ep.endpoint_count(),
            Self::Object { tree, .. } => tree.endpoint_count(),
        }
    }
}

/// An ordered list of named members forming one level of the tree.
#[derive(Default)]
pub struct ObjectTree {
    members: Vec<Member>,
}

impl ObjectTree {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    /// Append a leaf endpoint (property or function).
    pub fn endpoint(mut self, endpoint: Arc<dyn Endpoint>) -> Self {
        self.members.push(Member::Endpoint(endpoint));
        self
    }

    /// Append a named sub-object.
    pub fn object(mut self, name: impl Into<String>, tree: ObjectTree) -> Self {
        self.members.push(Member::Object {
            name: name.into(),
            tree,
        });
        self
    }

    /// Total endpoints declared in this tree, counted recursively.
    pub fn endpoint_count(&self) -> usize {
        self.members.iter().map(Member::endpoint_count).sum()
    }

    /// Emit the comma-joined JSON fragments of all members, assigning ids
    /// from `first_id` in declaration order.
    pub fn describe_members(&self, first_id: usize, out: &mut dyn ByteSink) -> Result<()> {
        let mut id = first_id;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                write_all(out, b",")?;
            }
            match member {
                Member::Endpoint(ep) => ep.describe(id, out)?,
                Member::Object { name, tree } => {
                    let mut w = FmtSink::new(out);
                    let _ = write!(w, "{{\"name\":\"{name}\",\"type\":\"object\",\"members\":[");
                    w.finish()?;
                    tree.describe_members(id, out)?;
                    write_all(out, b"]}")?;
                }
            }
            id += member.endpoint_count();
        }
        Ok(())
    }

    /// Resolve a dot-separated path to a leaf endpoint, peeling one segment
    /// per object level.
    pub fn resolve(&self, path: &str) -> Option<Arc<dyn Endpoint>> {
        for member in &self.members {
            match member {
                Member::Endpoint(ep) if ep.name() == path => return Some(Arc::clone(ep)),
                Member::Object { name, tree } => {
                    let rest = path
                        .strip_prefix(name.as_str())
                        .and_then(|r| r.strip_prefix('.'));
                    if let Some(rest) = rest {
                        if let Some(found) = tree.resolve(rest) {
                            return Some(found);
                        }
                    }
                }
                Member::Endpoint(_) => {}
            }
        }
        None
    }

    /// Place every member (and nested argument endpoints) into `slots`,
    /// starting at `first_id`.
    pub(crate) fn register(&self, slots: &mut [Option<Arc<dyn Endpoint>>], first_id: usize) {
        let mut id = first_id;
        for member in &self.members {
            match member {
                Member::Endpoint(ep) => place(slots, ep, id),
                Member::Object { tree, .. } => tree.register(slots, id),
            }
            id += member.endpoint_count();
        }
    }
}

fn place(slots: &mut [Option<Arc<dyn Endpoint>>], endpoint: &Arc<dyn Endpoint>, id: usize) {
    if let Some(slot) = slots.get_mut(id) {
        *slot = Some(Arc::clone(endpoint));
    }
    let mut child_id = id + 1;
    for child in endpoint.children() {
        place(slots, child, child_id);
        child_id += child.endpoint_count();
    }
}

// ── Tests ────────────────────────────────────────────────────
