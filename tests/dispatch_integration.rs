//! End-to-end dispatch tests: declared tree → published registry → framed
//! packets through a channel, the way a device process wires the engine.

use std::sync::{Arc, Mutex};

use tether::channel::{frame_packet, PacketSink, TX_BUF_SIZE};
use tether::endpoint::function::{arg, Function};
use tether::endpoint::property::{Property, ValueCell};
use tether::endpoint::TextAccess as _;
use tether::{schema, Endpoint as _, Error, ObjectTree, PacketChannel, Registry, Result};

/// Captures outbound packets for inspection.
#[derive(Default)]
struct CaptureSink {
    packets: Vec<Vec<u8>>,
}

impl PacketSink for CaptureSink {
    fn send(&mut self, packet: &[u8]) -> Result<()> {
        self.packets.push(packet.to_vec());
        Ok(())
    }

    fn max_packet_size(&self) -> Option<usize> {
        None
    }
}

/// Strip framing from a response packet: prefix(1) + id(2) + crc(1 or 2).
fn response_payload(packet: &[u8]) -> &[u8] {
    let crc_len = if packet.len() <= 8 { 1 } else { 2 };
    &packet[3..packet.len() - crc_len]
}

/// A device-side controller exposed over the protocol, in the style of an
/// animation controller bound through function endpoints.
struct Controller {
    calls: Mutex<Vec<(f32, f32)>>,
}

struct Fixture {
    registry: Arc<Registry>,
    brightness: ValueCell<u8>,
    controller: Arc<Controller>,
}

fn build_fixture() -> Fixture {
    let brightness = ValueCell::new(128u8);
    let controller = Arc::new(Controller {
        calls: Mutex::new(Vec::new()),
    });

    let (white, white_ep) = arg::<f32>("white");
    let (red, red_ep) = arg::<f32>("red");
    let set_color = {
        let controller = Arc::clone(&controller);
        Function::new(
            "set_color",
            vec![white_ep, red_ep],
            vec![],
            Box::new(move || {
                controller.calls.lock().unwrap().push((white.get(), red.get()));
            }),
        )
    };

    let tree = ObjectTree::new()
        .endpoint(Arc::new(Property::read_write(
            "brightness",
            brightness.clone(),
        )))
        .object(
            "strip",
            ObjectTree::new()
                .endpoint(Arc::new(set_color))
                .endpoint(Arc::new(Property::read_only(
                    "length",
                    ValueCell::new(167u32),
                ))),
        );

    Fixture {
        registry: Registry::publish(tree),
        brightness,
        controller,
    }
}

#[test]
fn published_table_length_matches_recursive_count() {
    let fixture = build_fixture();
    // descriptor + brightness + set_color(+2 args) + length
    assert_eq!(fixture.registry.len(), 6);
}

#[test]
fn schema_is_well_formed_and_maps_paths_to_ids() {
    let fixture = build_fixture();
    let mut channel = PacketChannel::new(Arc::clone(&fixture.registry));

    // Fetch the full schema in chunks using the offset payload.
    let mut raw = Vec::new();
    loop {
        let mut sink = CaptureSink::default();
        let request = frame_packet(0, &(raw.len() as u32).to_le_bytes()).unwrap();
        channel.process_packet(&request, &mut sink).unwrap();
        let Some(packet) = sink.packets.first() else {
            break; // no response: past the end of the document
        };
        raw.extend_from_slice(response_payload(packet));
    }

    assert_eq!(raw[0], b'{');
    let members = schema::parse(&raw).unwrap();
    assert_eq!(members[0].ty, "json");
    assert_eq!(members[0].id, Some(0));

    assert_eq!(schema::resolve_id(&members, "brightness"), Some(1));
    assert_eq!(schema::resolve_id(&members, "strip.set_color"), Some(2));
    assert_eq!(schema::resolve_id(&members, "strip.length"), Some(5));
}

#[test]
fn fingerprint_is_stable_across_republish() {
    assert_eq!(
        build_fixture().registry.fingerprint(),
        build_fixture().registry.fingerprint()
    );
}

#[test]
fn read_write_round_trip_streams_old_value_then_commits() {
    let fixture = build_fixture();
    let mut channel = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut sink = CaptureSink::default();

    // Write 200 to brightness (id 1); response carries the old 128.
    let request = frame_packet(1, &[200]).unwrap();
    channel.process_packet(&request, &mut sink).unwrap();
    assert_eq!(response_payload(&sink.packets[0]), &[128]);
    assert_eq!(fixture.brightness.get(), 200);

    // A read with no payload now returns the committed value.
    let request = frame_packet(1, &[]).unwrap();
    channel.process_packet(&request, &mut sink).unwrap();
    assert_eq!(response_payload(&sink.packets[1]), &[200]);
}

#[test]
fn function_invocation_via_argument_endpoints() {
    let fixture = build_fixture();
    let mut channel = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut sink = CaptureSink::default();

    // set_color is id 2; its white/red inputs are ids 3 and 4.
    let set_white = frame_packet(3, &1.0f32.to_le_bytes()).unwrap();
    let set_red = frame_packet(4, &0.5f32.to_le_bytes()).unwrap();
    let invoke = frame_packet(2, &[]).unwrap();

    channel.process_packet(&set_white, &mut sink).unwrap();
    channel.process_packet(&set_red, &mut sink).unwrap();
    channel.process_packet(&invoke, &mut sink).unwrap();

    assert_eq!(
        fixture.controller.calls.lock().unwrap().as_slice(),
        &[(1.0, 0.5)]
    );
}

#[test]
fn read_only_property_rejects_writes_over_the_wire() {
    let fixture = build_fixture();
    let mut channel = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut sink = CaptureSink::default();

    let request = frame_packet(5, &[0, 0, 0, 0]).unwrap();
    channel.process_packet(&request, &mut sink).unwrap();
    // Old value streamed back, new value not committed.
    assert_eq!(response_payload(&sink.packets[0]), &167u32.to_le_bytes());

    let request = frame_packet(5, &[]).unwrap();
    channel.process_packet(&request, &mut sink).unwrap();
    assert_eq!(response_payload(&sink.packets[1]), &167u32.to_le_bytes());
}

#[test]
fn unknown_endpoint_produces_no_response() {
    let fixture = build_fixture();
    let mut channel = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut sink = CaptureSink::default();

    let request = frame_packet(6, &[1, 2, 3, 4]).unwrap();
    assert_eq!(
        channel.process_packet(&request, &mut sink),
        Err(Error::UnknownEndpoint { id: 6 })
    );
    assert!(sink.packets.is_empty());
}

#[test]
fn at_most_one_response_per_request() {
    let fixture = build_fixture();
    let mut channel = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut sink = CaptureSink::default();

    for _ in 0..3 {
        let request = frame_packet(1, &[]).unwrap();
        channel.process_packet(&request, &mut sink).unwrap();
    }
    assert_eq!(sink.packets.len(), 3);
}

#[test]
fn two_channels_share_one_registry() {
    let fixture = build_fixture();
    let mut a = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut b = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut sink = CaptureSink::default();

    let write = frame_packet(1, &[7]).unwrap();
    a.process_packet(&write, &mut sink).unwrap();

    let read = frame_packet(1, &[]).unwrap();
    b.process_packet(&read, &mut sink).unwrap();
    assert_eq!(response_payload(&sink.packets[1]), &[7]);
}

#[test]
fn legacy_text_access_through_path_resolution() {
    let fixture = build_fixture();

    let endpoint = fixture.registry.resolve("brightness").unwrap();
    let text = endpoint.text().unwrap();
    assert_eq!(text.get_text().as_deref(), Some("128"));
    assert!(text.set_text("42"));
    assert_eq!(fixture.brightness.get(), 42);

    // Functions expose no text accessor.
    let func = fixture.registry.resolve("strip.set_color").unwrap();
    assert!(func.text().is_none());
}

#[test]
fn schema_chunking_respects_tx_buffer() {
    let fixture = build_fixture();
    let mut channel = PacketChannel::new(Arc::clone(&fixture.registry));
    let mut sink = CaptureSink::default();

    let request = frame_packet(0, &0u32.to_le_bytes()).unwrap();
    channel.process_packet(&request, &mut sink).unwrap();
    assert!(response_payload(&sink.packets[0]).len() <= TX_BUF_SIZE);
}
