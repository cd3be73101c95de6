//! Fuzz target: `PacketChannel::process_packet`
//!
//! Drives arbitrary byte sequences into a channel bound to a small published
//! registry and asserts that dispatch never panics and never emits a response
//! longer than the wire maximum.
//!
//! cargo fuzz run fuzz_packet_channel

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use tether::channel::{PacketSink, MAX_PACKET_SIZE};
use tether::endpoint::function::{arg, Function};
use tether::endpoint::property::{Property, ValueCell};
use tether::{ObjectTree, PacketChannel, Registry, Result};

struct BoundedSink;

impl PacketSink for BoundedSink {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        assert!(
            packet.len() <= MAX_PACKET_SIZE,
            "response exceeds MAX_PACKET_SIZE"
        );
        Ok(())
    }

    fn max_packet_size(&self) -> Option<usize> {
        Some(64)
    }
}

fn registry() -> Arc<Registry> {
    let (_white, white_ep) = arg::<f32>("white");
    let blink = Function::new("blink", vec![white_ep], vec![], Box::new(|| {}));
    let tree = ObjectTree::new()
        .endpoint(Arc::new(Property::read_write(
            "brightness",
            ValueCell::new(0u8),
        )))
        .endpoint(Arc::new(blink));
    Registry::publish(tree)
}

fuzz_target!(|data: &[u8]| {
    let mut channel = PacketChannel::new(registry());

    // Whole input as one packet (may contain any prefix, id, checksum).
    let _ = channel.process_packet(data, &mut BoundedSink);

    // Split interpretation: two back-to-back packets on the same channel.
    let mid = data.len() / 2;
    let _ = channel.process_packet(&data[..mid], &mut BoundedSink);
    let _ = channel.process_packet(&data[mid..], &mut BoundedSink);
});
