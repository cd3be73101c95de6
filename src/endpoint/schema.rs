//! The singleton schema-descriptor endpoint, always published at id 0.
//!
//! Its "value" is the serialized JSON description of the whole tree: its own
//! fragment first, then every declared member, comma-joined. No outer
//! brackets are emitted — consumers delimit the stream themselves (see
//! [`crate::schema::parse`]), which keeps emission purely incremental and
//! lets the fingerprint CRC consume the identical byte sequence.
//!
//! The request payload may carry a little-endian u32 byte offset, letting
//! clients fetch a schema larger than one packet in successive chunks.

use core::fmt::Write as _;
use std::sync::Arc;

use crate::codec::WireValue;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::sink::{write_all, ByteSink, FmtSink, OffsetSink};
use crate::tree::ObjectTree;

/// Meta-endpoint describing the entire published tree.
pub struct SchemaDescriptor {
    tree: Arc<ObjectTree>,
}

impl SchemaDescriptor {
    pub fn new(tree: Arc<ObjectTree>) -> Self {
        Self { tree }
    }

    /// Stream the full schema document from byte 0.
    pub fn write_document(&self, out: &mut dyn ByteSink) -> Result<()> {
        self.describe(0, out)?;
        if self.tree.endpoint_count() > 0 {
            write_all(out, b",")?;
            self.tree.describe_members(1, out)?;
        }
        Ok(())
    }
}

impl Endpoint for SchemaDescriptor {
    fn name(&self) -> &str {
        ""
    }

    fn describe(&self, id: usize, out: &mut dyn ByteSink) -> Result<()> {
        let mut w = FmtSink::new(out);
        let _ = write!(w, "{{\"name\":\"\",\"id\":{id},\"type\":\"json\",\"access\":\"r\"}}");
        w.finish()
    }

    fn handle(&self, input: &[u8], output: Option<&mut dyn ByteSink>) {
        let Some(out) = output else { return };
        let offset = if input.len() >= 4 {
            u32::read_le(input) as usize
        } else {
            0
        };
        let mut window = OffsetSink::new(out, offset);
        // A full sink just truncates the chunk; the client re-requests with
        // a larger offset.
        let _ = self.write_document(&mut window);
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::property::{Property, ValueCell};
    use crate::sink::SliceSink;

    fn descriptor() -> SchemaDescriptor {
        let tree = ObjectTree::new().endpoint(Arc::new(Property::read_write(
            "speed",
            ValueCell::new(0u16),
        )));
        SchemaDescriptor::new(Arc::new(tree))
    }

    #[test]
    fn document_lists_descriptor_then_members() {
        let mut buf = [0u8; 256];
        let mut out = SliceSink::new(&mut buf);
        descriptor().write_document(&mut out).unwrap();

        assert_eq!(
            core::str::from_utf8(out.filled()).unwrap(),
            concat!(
                r#"{"name":"","id":0,"type":"json","access":"r"},"#,
                r#"{"name":"speed","id":1,"type":"uint16","access":"rw"}"#,
            )
        );
    }

    #[test]
    fn dispatch_starts_at_requested_offset() {
        let desc = descriptor();

        let mut full = [0u8; 256];
        let mut full_sink = SliceSink::new(&mut full);
        desc.handle(&[], Some(&mut full_sink));
        let full_len = full_sink.len();

        let mut tail = [0u8; 256];
        let mut tail_sink = SliceSink::new(&mut tail);
        desc.handle(&10u32.to_le_bytes(), Some(&mut tail_sink));
        let tail_len = tail_sink.len();

        assert_eq!(tail_len, full_len - 10);
        assert_eq!(&tail[..tail_len], &full[10..full_len]);
    }

    #[test]
    fn empty_tree_is_descriptor_only() {
        let desc = SchemaDescriptor::new(Arc::new(ObjectTree::new()));
        let mut buf = [0u8; 128];
        let mut out = SliceSink::new(&mut buf);
        desc.write_document(&mut out).unwrap();
        let text = core::str::from_utf8(out.filled()).unwrap();
        assert!(text.starts_with('{'));
        assert!(!text.ends_with(','));
    }
}
