//! Capability negotiation as seen through a live connection.

mod common;

use std::time::Duration;

use classicwire::{
    Catalog,
    ConnectionBuilder,
    OpcodeTable,
    PacketError,
    Phase,
    ProtocolCodec,
    Session,
    TraceCodec,
    client::{DEFAULT_JUMP_VELOCITY, PlayerTunables},
    codec::writer::PlayerPosition,
    dispatch::opcode,
    extension::{Effect, FeatureSet, KnownCapability, Requirement},
};
use classicwire_testing::packets;
use common::Harness;
use rstest::rstest;

const RESIZED: u8 = 0x03;

/// Codec with a single opcode that the `Foo` capability widens by two bytes.
#[derive(Default)]
struct Recorder {
    payloads: Vec<Vec<u8>>,
}

impl ProtocolCodec for Recorder {
    fn catalog(&self) -> Catalog {
        Catalog::new(
            vec![KnownCapability {
                name: "Foo",
                baseline_version: 1,
                requirement: Requirement::None,
                effects: &[Effect::GrowSize {
                    opcode: RESIZED,
                    delta: 2,
                }],
            }],
            Vec::new(),
        )
    }

    fn register(&self, table: &mut OpcodeTable<Self>) { table.register(RESIZED, record, 4); }
}

fn record(session: &mut Session<'_, Recorder>, payload: &[u8]) -> Result<(), PacketError> {
    session.codec().payloads.push(payload.to_vec());
    Ok(())
}

#[test]
fn negotiated_capability_widens_opcode() {
    let mut h = Harness::active(ConnectionBuilder::new(Recorder::default()));
    h.feed(packets::negotiation("Server", &[("Foo", 1)]));
    assert_eq!(h.connection.table().size(RESIZED), 6);

    let frame = [RESIZED, 1, 2, 3, 4, 5, 6];
    h.feed(&frame[..5]);
    assert!(h.connection.codec().payloads.is_empty());
    assert_eq!(h.connection.buffered_bytes(), 5);

    h.feed(&frame[5..]);
    assert_eq!(h.connection.codec().payloads, vec![vec![1, 2, 3, 4, 5, 6]]);
    assert_eq!(h.connection.buffered_bytes(), 0);
    assert_eq!(h.connection.phase(), Phase::Active);
}

#[test]
fn unknown_capability_changes_nothing() {
    let mut h = Harness::active(ConnectionBuilder::new(Recorder::default()));
    h.feed(packets::negotiation("Server", &[("Bar", 3)]));
    assert_eq!(h.connection.table().size(RESIZED), 4);
    assert!(h.connection.features().is_empty());
    assert!(h.connection.registry().is_complete());
}

#[test]
fn client_list_is_sent_after_last_entry() {
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()).app_name("tester"));
    h.feed(packets::ext_info("MCGalaxy", 2));
    h.feed(packets::ext_entry("LongerMessages", 1));
    assert!(h.transport.written().is_empty());

    h.feed(packets::ext_entry("FullCP437", 1));
    let written = h.transport.take_written();
    assert_eq!(written[0], opcode::EXT_INFO);
    assert_eq!(packets::string_at(&written, 1), "tester");
    assert_eq!(written[65..67], [0, 30]);
    assert_eq!(written[67], opcode::EXT_ENTRY);
    assert_eq!(packets::string_at(&written, 68), "ClickDistance");
    assert_eq!(written.len(), 67 + 30 * 69);

    assert!(h.connection.features().contains(FeatureSet::PARTIAL_MESSAGES));
    assert!(h.connection.features().contains(FeatureSet::FULL_CP437));
}

#[test]
fn extended_blocks_are_not_advertised_without_support() {
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()).extended_blocks(false));
    h.feed(packets::negotiation("MCGalaxy", &[("ExtendedBlocks", 1)]));
    let written = h.transport.take_written();
    assert_eq!(written[65..67], [0, 29]);
    assert_eq!(h.connection.table().size(opcode::SET_BLOCK), 7);
    assert!(!h.connection.features().contains(FeatureSet::EXTENDED_BLOCKS));
}

#[test]
fn duplicate_announcement_warns() {
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()));
    h.feed(packets::negotiation(
        "Server",
        &[("ExtEntityPositions", 1), ("ExtEntityPositions", 1)],
    ));
    assert_eq!(h.connection.table().size(opcode::ENTITY_TELEPORT), 15);
    assert_eq!(
        h.events.warnings(),
        vec!["Server announced ExtEntityPositions twice".to_owned()]
    );
}

#[rstest]
#[case::old_format(1, 68)]
#[case::new_format(2, 72)]
fn map_appearance_size_depends_on_version(#[case] version: i32, #[case] expected: u16) {
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()));
    h.feed(packets::negotiation("Server", &[("EnvMapAppearance", version)]));
    assert_eq!(
        h.connection.table().size(opcode::ENV_SET_MAP_APPEARANCE),
        expected
    );
}

fn d3_harness(app: &str) -> Harness<TraceCodec> {
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()));
    h.feed(packets::negotiation(app, &[]));
    h.connection.state_mut().tunables = PlayerTunables {
        jump_velocity: 1.5,
        server_jump_velocity: 1.5,
    };
    h
}

#[rstest]
#[case::zero(0x00)]
#[case::high(0xFF)]
fn d3_stray_byte_is_skipped(#[case] stray: u8) {
    let mut h = d3_harness("D3 server 1.0");
    let mut bytes = packets::hack_control(40);
    bytes.push(stray);
    bytes.extend(packets::message(0, "after"));
    h.feed(bytes);

    assert_eq!(h.connection.phase(), Phase::Active);
    assert_eq!(h.connection.codec().count(opcode::HACK_CONTROL), 1);
    assert_eq!(h.connection.codec().messages(), ["after"]);
    assert_eq!(
        h.connection.state().tunables.jump_velocity,
        DEFAULT_JUMP_VELOCITY
    );
}

#[test]
fn other_byte_after_hack_control_starts_next_packet() {
    let mut h = d3_harness("D3 server 1.0");
    let mut bytes = packets::hack_control(40);
    bytes.extend(packets::message(0, "next"));
    h.feed(bytes);

    assert_eq!(h.connection.codec().messages(), ["next"]);
    assert_eq!(h.connection.state().tunables.jump_velocity, 1.5);
}

#[test]
fn stray_byte_from_other_servers_is_a_violation() {
    let mut h = d3_harness("MCGalaxy 1.9");
    let mut bytes = packets::hack_control(40);
    bytes.push(0xFF);
    h.feed(bytes);
    assert_eq!(h.disconnect_title(), "Protocol error");
}

#[test]
fn server_ping_is_echoed() {
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()));
    h.feed(packets::negotiation("Server", &[("TwoWayPing", 1)]));
    let _ = h.transport.take_written();

    h.feed(packets::two_way_ping(true, 0x1234));
    assert_eq!(h.transport.take_written(), [opcode::TWO_WAY_PING, 1, 0x12, 0x34]);
}

#[test]
fn client_ping_reply_updates_latency() {
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()));
    h.feed(packets::negotiation("Server", &[("TwoWayPing", 1)]));
    let written = h.transport.take_written();
    let ping = &written[written.len() - 4..];
    assert_eq!(ping[..2], [opcode::TWO_WAY_PING, 0]);
    let data = u16::from_be_bytes([ping[2], ping[3]]);

    h.clock.advance(Duration::from_millis(40));
    h.feed(packets::two_way_ping(false, data));
    assert_eq!(
        h.connection.state().pings.average(),
        Some(Duration::from_millis(20))
    );
}

#[test]
fn position_width_follows_ext_entity_positions() {
    let position = PlayerPosition {
        x: 70_000,
        y: 64,
        z: -3,
        yaw: 128,
        pitch: 0,
    };
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()));
    h.connection.send_position(position, 1);
    let narrow = h.transport.take_written();
    assert_eq!(narrow.len(), 10);
    assert_eq!(narrow[..2], [opcode::ENTITY_TELEPORT, 0xFF]);

    h.feed(packets::negotiation("Server", &[("ExtEntityPositions", 1)]));
    let _reply = h.transport.take_written();
    h.connection.send_position(position, 1);
    let wide = h.transport.take_written();
    assert_eq!(wide.len(), 16);
    assert_eq!(wide[2..6], 70_000_i32.to_be_bytes());
    assert_eq!(wide[14..], [128, 0]);
}
