//! Builders for server-sent packets.
//!
//! Each function returns one complete frame: the opcode byte followed by the
//! baseline payload. Strings are space-padded to 64 bytes.

use bytes::{BufMut, BytesMut};
use classicwire::{
    codec::cp437::{STRING_LENGTH, encode_padded},
    dispatch::opcode,
};

fn frame(op: u8) -> BytesMut {
    let mut buf = BytesMut::new();
    buf.put_u8(op);
    buf
}

fn put_string(buf: &mut BytesMut, text: &str) { buf.put_slice(&encode_padded(text, true)); }

/// `Handshake` announcing `name` and `motd`.
#[must_use]
pub fn handshake(name: &str, motd: &str, operator: bool) -> Vec<u8> {
    let mut buf = frame(opcode::HANDSHAKE);
    buf.put_u8(7);
    put_string(&mut buf, name);
    put_string(&mut buf, motd);
    buf.put_u8(if operator { 0x64 } else { 0 });
    buf.to_vec()
}

/// Keepalive.
#[must_use]
pub fn ping() -> Vec<u8> { vec![opcode::PING] }

/// `Kick` with a reason.
#[must_use]
pub fn kick(reason: &str) -> Vec<u8> {
    let mut buf = frame(opcode::KICK);
    put_string(&mut buf, reason);
    buf.to_vec()
}

/// `Message` with chat text.
#[must_use]
pub fn message(kind: u8, text: &str) -> Vec<u8> {
    let mut buf = frame(opcode::MESSAGE);
    buf.put_u8(kind);
    put_string(&mut buf, text);
    buf.to_vec()
}

/// `LevelFinalise` with map dimensions.
#[must_use]
pub fn level_finalise(width: i16, height: i16, length: i16) -> Vec<u8> {
    let mut buf = frame(opcode::LEVEL_FINALISE);
    buf.put_i16(width);
    buf.put_i16(height);
    buf.put_i16(length);
    buf.to_vec()
}

/// `ExtInfo` announcing `count` capabilities.
#[must_use]
pub fn ext_info(app_name: &str, count: i16) -> Vec<u8> {
    let mut buf = frame(opcode::EXT_INFO);
    put_string(&mut buf, app_name);
    buf.put_i16(count);
    buf.to_vec()
}

/// `ExtEntry` announcing one capability.
#[must_use]
pub fn ext_entry(name: &str, version: i32) -> Vec<u8> {
    let mut buf = frame(opcode::EXT_ENTRY);
    put_string(&mut buf, name);
    buf.put_i32(version);
    buf.to_vec()
}

/// `ExtInfo` followed by one `ExtEntry` per capability.
#[must_use]
pub fn negotiation(app_name: &str, capabilities: &[(&str, i32)]) -> Vec<u8> {
    let count = i16::try_from(capabilities.len()).unwrap_or(i16::MAX);
    let mut out = ext_info(app_name, count);
    for (name, version) in capabilities {
        out.extend(ext_entry(name, *version));
    }
    out
}

/// `HackControl` with every hack allowed and the given jump height.
#[must_use]
pub fn hack_control(jump_height: i16) -> Vec<u8> {
    let mut buf = frame(opcode::HACK_CONTROL);
    buf.put_slice(&[1, 1, 1, 1, 1]);
    buf.put_i16(jump_height);
    buf.to_vec()
}

/// `TwoWayPing`.
#[must_use]
pub fn two_way_ping(server_initiated: bool, data: u16) -> Vec<u8> {
    let mut buf = frame(opcode::TWO_WAY_PING);
    buf.put_u8(u8::from(server_initiated));
    buf.put_u16(data);
    buf.to_vec()
}

/// An arbitrary frame with a zero-filled payload of `size` bytes.
#[must_use]
pub fn raw(op: u8, size: usize) -> Vec<u8> {
    let mut out = vec![0; size + 1];
    out[0] = op;
    out
}

/// Decode a padded string field from outbound bytes.
#[must_use]
pub fn string_at(bytes: &[u8], offset: usize) -> String {
    classicwire::codec::cp437::decode_padded(&bytes[offset..offset + STRING_LENGTH])
}
