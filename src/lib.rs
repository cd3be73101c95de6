//! Tether — self-describing typed endpoint protocol engine.
//!
//! An embedded device declares a tree of typed properties and callable
//! functions once at startup; the engine flattens it into a dense,
//! read-only endpoint table, derives a schema fingerprint, and dispatches
//! checksummed binary packets against it with O(1) lookup and no
//! allocation on the hot path.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Engine stack                           │
//! │                                                              │
//! │  ┌───────────┐   ┌───────────────┐   ┌────────────────────┐  │
//! │  │ Transport │──▶│ PacketChannel │──▶│ Registry (table)   │  │
//! │  │ (packets) │   │ (parse+frame) │   │  → Endpoint::handle│  │
//! │  └───────────┘   └───────────────┘   └────────────────────┘  │
//! │        ▲                │                      │             │
//! │        └── response ────┘          ValueCell / Function      │
//! │                                    (application objects)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Clients fetch the JSON schema from endpoint 0, verify the fingerprint,
//! then address everything by endpoint id. Transports, socket I/O, and the
//! legacy text console are consumers of this crate, not part of it.

#![deny(unused_must_use)]

pub mod channel;
pub mod codec;
pub mod crc;
pub mod endpoint;
pub mod receiver;
pub mod registry;
pub mod schema;
pub mod sink;
pub mod tree;

mod error;

/// Protocol version; seeds the CRC16 used for message checksums and the
/// schema fingerprint, so mismatched peers fail verification outright.
pub const PROTOCOL_VERSION: u16 = 1;

pub use channel::{PacketChannel, PacketSink};
pub use endpoint::function::Function;
pub use endpoint::property::{Property, ValueCell};
pub use endpoint::{Access, Endpoint};
pub use error::{Error, Result};
pub use registry::Registry;
pub use tree::ObjectTree;
