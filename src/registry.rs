//! Endpoint table publisher.
//!
//! `Registry::publish` is the one-time build step: allocate the flat table
//! (`1 + endpoint_count` slots), put the schema descriptor at id 0, register
//! the declared tree from id 1, then derive the schema fingerprint by
//! streaming the descriptor's own JSON output through a CRC16 seeded with
//! the protocol version.
//!
//! Ordering matters: the table must exist before the fingerprint pass so the
//! descriptor is already dispatchable during its own emission, and both must
//! exist before any external packet is served. The returned value is
//! immutable — there is no rebuild, no global, and channels share it behind
//! an `Arc`, so concurrent readers are safe by construction. Endpoint value
//! storage is synchronized per cell only; wider consistency belongs to the
//! owning application.

use std::sync::Arc;

use log::{debug, info};

use crate::crc::Crc16;
use crate::endpoint::schema::SchemaDescriptor;
use crate::endpoint::Endpoint;
use crate::tree::ObjectTree;
use crate::PROTOCOL_VERSION;

/// The published, read-only endpoint table plus schema fingerprint.
pub struct Registry {
    table: Vec<Arc<dyn Endpoint>>,
    tree: Arc<ObjectTree>,
    fingerprint: u16,
}

impl Registry {
    /// Flatten `tree` into the endpoint table and compute the fingerprint.
    pub fn publish(tree: ObjectTree) -> Arc<Self> {
        let tree = Arc::new(tree);
        let descriptor = Arc::new(SchemaDescriptor::new(Arc::clone(&tree)));

        let len = 1 + tree.endpoint_count();
        let mut slots: Vec<Option<Arc<dyn Endpoint>>> = vec![None; len];
        slots[0] = Some(Arc::clone(&descriptor) as Arc<dyn Endpoint>);
        tree.register(&mut slots, 1);

        let table: Vec<Arc<dyn Endpoint>> = slots.into_iter().flatten().collect();
        // Counts and registration walk the same declared structure, so every
        // slot is filled exactly once.
        debug_assert_eq!(table.len(), len);

        let mut crc = Crc16::new(PROTOCOL_VERSION);
        descriptor.handle(&0u32.to_le_bytes(), Some(&mut crc));
        let fingerprint = crc.value();

        info!(
            "registry: published {} endpoints, fingerprint 0x{fingerprint:04X}",
            table.len()
        );

        Arc::new(Self {
            table,
            tree,
            fingerprint,
        })
    }

    /// Look up an endpoint by id. O(1); `None` for out-of-range ids.
    pub fn endpoint(&self, id: u16) -> Option<&Arc<dyn Endpoint>> {
        self.table.get(usize::from(id))
    }

    /// Number of published endpoints (including the schema descriptor).
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Never true: the descriptor itself always occupies id 0.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// 16-bit compatibility token over the serialized schema, seeded with
    /// the protocol version. Identical trees yield identical fingerprints.
    pub fn fingerprint(&self) -> u16 {
        self.fingerprint
    }

    /// Resolve a dot-separated path to an endpoint (legacy text consumers).
    pub fn resolve(&self, path: &str) -> Option<Arc<dyn Endpoint>> {
        let found = self.tree.resolve(path);
        if found.is_none() {
            debug!("registry: no endpoint at path {path:?}");
        }
        found
    }
}

// ── Tests ────────────────────────────────────────────────────
