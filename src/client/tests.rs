//! Unit tests for the connection engine.

use std::{
    cell::RefCell,
    io::{self, Read, Write},
    rc::Rc,
    time::Duration,
};

use rstest::{fixture, rstest};

use super::*;
use crate::{
    codec::{TraceCodec, writer::SELF_ID},
    dispatch::opcode,
    error::ProtocolViolation,
    transport::{ConnectPoll, Transport},
};

const TICK: Duration = Duration::from_millis(16);
const LOGIN_LEN: usize = 131;

/// Transport that never has data and records writes.
#[derive(Clone, Default)]
struct SilentTransport {
    written: Rc<RefCell<Vec<u8>>>,
}

impl Read for SilentTransport {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> { Err(io::ErrorKind::WouldBlock.into()) }
}

impl Write for SilentTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Transport for SilentTransport {
    fn poll_connect(&mut self) -> io::Result<ConnectPoll> { Ok(ConnectPoll::Connected) }

    fn probe_alive(&mut self) -> bool { true }

    fn shutdown(&mut self) {}
}

type TestConnection = Connection<TraceCodec, (), SilentTransport>;

#[fixture]
fn active() -> (TestConnection, SilentTransport) {
    let transport = SilentTransport::default();
    let mut connection = ConnectionBuilder::new(TraceCodec::new()).build_with_transport();
    connection.begin_connect_with("127.0.0.1:25565".parse().expect("address"), transport.clone());
    connection.tick(TICK);
    assert_eq!(connection.phase(), Phase::Active);
    (connection, transport)
}

#[test]
fn builder_starts_disconnected_with_defaults() {
    let connection = ConnectionBuilder::new(TraceCodec::new()).build();
    assert_eq!(connection.phase(), Phase::Disconnected);
    assert_eq!(connection.config().username, "Singleplayer");
    assert!(connection.features().is_empty());
    assert!(connection.last_disconnect().is_none());
}

#[rstest]
fn connect_sends_login(active: (TestConnection, SilentTransport)) {
    let (connection, transport) = active;
    let written = transport.written.borrow();
    assert_eq!(written.len(), LOGIN_LEN);
    assert_eq!(written[0], opcode::HANDSHAKE);
    assert_eq!(written[LOGIN_LEN - 1], 0x42);
    assert!(connection.is_subscribed_to_edits());
}

#[rstest]
fn partial_packet_waits_for_more_bytes(active: (TestConnection, SilentTransport)) {
    let (mut connection, _) = active;
    let mut frame = vec![opcode::LEVEL_FINALISE, 0, 16, 0, 64];
    connection.recv.extend_from_slice(&frame);
    connection.dispatch_buffered(connection.clock.now()).expect("dispatch");
    assert_eq!(connection.buffered_bytes(), frame.len());

    frame.clear();
    frame.extend([0, 16]);
    connection.recv.extend_from_slice(&frame);
    connection.dispatch_buffered(connection.clock.now()).expect("dispatch");
    assert_eq!(connection.buffered_bytes(), 0);
    assert_eq!(connection.codec().level_size(), Some([16, 64, 16]));
}

#[rstest]
fn stray_byte_after_hack_control_is_skipped_for_d3(active: (TestConnection, SilentTransport)) {
    let (mut connection, _) = active;
    let state = connection.state_mut();
    state.needs_d3_fix = true;
    state.last_opcode = Some(opcode::HACK_CONTROL);
    state.tunables.jump_velocity = 2.0;

    connection.recv.extend_from_slice(&[0xFF, opcode::PING]);
    connection.dispatch_buffered(connection.clock.now()).expect("dispatch");

    assert_eq!(connection.buffered_bytes(), 0);
    assert_eq!(connection.state().tunables, PlayerTunables::default());
    assert_eq!(connection.state().last_opcode, Some(opcode::PING));
}

#[rstest]
fn only_one_stray_byte_is_skipped(active: (TestConnection, SilentTransport)) {
    let (mut connection, _) = active;
    let state = connection.state_mut();
    state.needs_d3_fix = true;
    state.last_opcode = Some(opcode::HACK_CONTROL);

    connection.recv.extend_from_slice(&[0xFF, 0xFF]);
    let err = connection
        .dispatch_buffered(connection.clock.now())
        .expect_err("second stray byte");
    assert_eq!(
        err,
        ProtocolViolation::InvalidOpcode {
            opcode: 0xFF,
            position: 1,
            highest: opcode::SET_INVENTORY_ORDER,
        }
    );
}

#[rstest]
fn stray_byte_without_d3_server_is_a_violation(active: (TestConnection, SilentTransport)) {
    let (mut connection, _) = active;
    connection.state_mut().last_opcode = Some(opcode::HACK_CONTROL);
    connection.recv.extend_from_slice(&[0xFF]);
    let err = connection
        .dispatch_buffered(connection.clock.now())
        .expect_err("stray byte");
    assert_eq!(err.opcode(), 0xFF);
    assert_eq!(err.position(), 0);
}

#[rstest]
fn opcode_below_watermark_without_handler_is_unhandled(
    active: (TestConnection, SilentTransport),
) {
    let (mut connection, _) = active;
    connection.recv.extend_from_slice(&[opcode::SET_BLOCK_CLIENT]);
    let err = connection
        .dispatch_buffered(connection.clock.now())
        .expect_err("client-only opcode");
    assert_eq!(
        err,
        ProtocolViolation::UnhandledOpcode {
            opcode: opcode::SET_BLOCK_CLIENT,
            position: 0,
        }
    );
}

#[rstest]
fn kick_stops_dispatch_before_later_packets(active: (TestConnection, SilentTransport)) {
    let (mut connection, _) = active;
    let mut bytes = vec![opcode::KICK];
    bytes.extend(crate::codec::cp437::encode_padded("Bye", false));
    bytes.push(opcode::PING);
    connection.recv.extend_from_slice(&bytes);

    connection.dispatch_buffered(connection.clock.now()).expect("dispatch");
    assert_eq!(connection.buffered_bytes(), 1);
    let reason = connection.state().pending_disconnect().expect("kick recorded");
    assert_eq!(reason.detail, "Bye");
}

#[rstest]
fn long_chat_is_split_into_messages(active: (TestConnection, SilentTransport)) {
    let (mut connection, transport) = active;
    transport.written.borrow_mut().clear();
    connection.send_chat(&"a".repeat(100));

    let written = transport.written.borrow();
    assert_eq!(written.len(), 2 * 66);
    assert_eq!(written[0], opcode::MESSAGE);
    assert_eq!(written[1], SELF_ID);
    assert_eq!(written[66], opcode::MESSAGE);
}

#[rstest]
#[case::placed(3, 3, 1)]
#[case::broken(0, 7, 0)]
fn block_change_sends_set_block(
    active: (TestConnection, SilentTransport),
    #[case] block: u16,
    #[case] expected_id: u8,
    #[case] expected_mode: u8,
) {
    let (mut connection, transport) = active;
    transport.written.borrow_mut().clear();
    connection.on_block_changed([1, 2, 3], block, 7);

    let written = transport.written.borrow();
    assert_eq!(written.as_slice(), [
        opcode::SET_BLOCK_CLIENT,
        0,
        1,
        0,
        2,
        0,
        3,
        expected_mode,
        expected_id
    ]);
}

#[rstest]
fn edits_are_ignored_after_disconnect(active: (TestConnection, SilentTransport)) {
    let (mut connection, transport) = active;
    connection.disconnect(crate::error::DisconnectReason::new("t", "d"));
    transport.written.borrow_mut().clear();
    connection.on_block_changed([0, 0, 0], 1, 1);
    assert!(transport.written.borrow().is_empty());
    assert!(!connection.is_subscribed_to_edits());
}

fn padded(text: &str) -> [u8; 64] { crate::codec::cp437::encode_padded(text, false) }

/// Server handshake followed by a negotiation of `entries` from `app`.
fn identify_and_negotiate(app: &str, entries: &[&str]) -> Vec<u8> {
    let mut bytes = vec![opcode::HANDSHAKE, 7];
    bytes.extend(padded("Resettable"));
    bytes.extend(padded("motd"));
    bytes.push(0x64);
    bytes.push(opcode::EXT_INFO);
    bytes.extend(padded(app));
    bytes.extend(i16::try_from(entries.len()).expect("entry count").to_be_bytes());
    for name in entries {
        bytes.push(opcode::EXT_ENTRY);
        bytes.extend(padded(name));
        bytes.extend(1_i32.to_be_bytes());
    }
    bytes
}

#[rstest]
fn reset_protocol_restores_baseline_sizes(active: (TestConnection, SilentTransport)) {
    let (mut connection, _) = active;
    connection.recv.extend_from_slice(&identify_and_negotiate(
        "D3 server 1.0",
        &["ExtEntityPositions", "FastMap"],
    ));
    connection.dispatch_buffered(connection.clock.now()).expect("dispatch");
    assert_eq!(connection.table().size(opcode::ENTITY_TELEPORT), 15);
    assert_eq!(connection.table().size(opcode::LEVEL_INIT), 4);
    assert!(connection.state().needs_d3_fix);
    connection.state_mut().tunables.jump_velocity = 2.0;

    connection.reset_protocol();
    assert!(connection.features().is_empty());
    assert_eq!(connection.table().size(opcode::ENTITY_TELEPORT), 9);
    assert_eq!(connection.table().size(opcode::LEVEL_INIT), 0);
    assert!(!connection.state().needs_d3_fix);
    assert!(connection.state().last_opcode.is_none());
    assert_eq!(connection.phase(), Phase::Active);

    let state = connection.state();
    assert_eq!(state.server_name, "Resettable");
    assert_eq!(state.motd, "motd");
    assert!(state.operator);
    assert!((state.tunables.jump_velocity - 2.0).abs() < f32::EPSILON);
}

#[rstest]
#[tracing_test::traced_test]
fn stray_byte_skip_is_logged(active: (TestConnection, SilentTransport)) {
    let (mut connection, _) = active;
    let state = connection.state_mut();
    state.needs_d3_fix = true;
    state.last_opcode = Some(opcode::HACK_CONTROL);
    connection.recv.extend_from_slice(&[0x00]);
    connection.dispatch_buffered(connection.clock.now()).expect("dispatch");
    assert!(logs_contain("skipping stray HackControl byte"));
}
