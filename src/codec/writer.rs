//! Encoders for the packets the client sends.
//!
//! Each function appends one complete packet to a [`SendBuffer`]. Field
//! widths follow the negotiated [`FeatureSet`].

use crate::{
    dispatch::opcode,
    extension::FeatureSet,
    frame::{PacketWriter, SendBuffer},
};

/// Protocol version sent in the login packet.
pub const PROTOCOL_VERSION: u8 = 7;
/// Login marker advertising extension support.
pub const EXTENSION_MARKER: u8 = 0x42;
/// Entity id the protocol uses for the local player.
pub const SELF_ID: u8 = 0xFF;

/// Position and orientation of the local player.
///
/// Coordinates are fixed point with five fractional bits (32 units per
/// block). Angles are in 1/256ths of a turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerPosition {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate (feet plus eye offset as the server expects it).
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
    /// Heading.
    pub yaw: u8,
    /// Pitch.
    pub pitch: u8,
}

/// Mouse click reported to servers that negotiated `PlayerClick`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerClick {
    /// Mouse button: 0 left, 1 right, 2 middle.
    pub button: u8,
    /// The button was released rather than pressed.
    pub released: bool,
    /// Heading, in 1/65536ths of a turn.
    pub yaw: i16,
    /// Pitch, in 1/65536ths of a turn.
    pub pitch: i16,
    /// Targeted entity, or [`SELF_ID`] for none.
    pub target_entity: u8,
    /// Targeted block, or `-1` on every axis for none.
    pub block: [i16; 3],
    /// Targeted block face.
    pub face: u8,
}

/// Append the login packet.
pub fn login(buf: &mut SendBuffer, username: &str, mppass: &str, extensions: bool) {
    buf.packet(opcode::HANDSHAKE)
        .u8(PROTOCOL_VERSION)
        .string(username, false)
        .string(mppass, false)
        .u8(if extensions { EXTENSION_MARKER } else { 0 });
}

/// Append the client's `ExtInfo`.
pub fn ext_info(buf: &mut SendBuffer, app_name: &str, count: i16) {
    buf.packet(opcode::EXT_INFO).string(app_name, false).i16(count);
}

/// Append one client `ExtEntry`.
pub fn ext_entry(buf: &mut SendBuffer, name: &str, version: i32) {
    buf.packet(opcode::EXT_ENTRY).string(name, false).i32(version);
}

/// Append one chat message of at most 64 characters.
///
/// Servers that negotiated `LongerMessages` read the first byte as the
/// partial-message flag; others expect the player id.
pub fn chat(buf: &mut SendBuffer, features: FeatureSet, text: &str, partial: bool) {
    let lead = if features.contains(FeatureSet::PARTIAL_MESSAGES) {
        u8::from(partial)
    } else {
        SELF_ID
    };
    buf.packet(opcode::MESSAGE)
        .u8(lead)
        .string(text, features.contains(FeatureSet::FULL_CP437));
}

/// Append a position update.
pub fn position(buf: &mut SendBuffer, features: FeatureSet, pos: PlayerPosition, held_block: u16) {
    let mut packet = buf.packet(opcode::ENTITY_TELEPORT);
    if features.contains(FeatureSet::HELD_BLOCK) {
        block(&mut packet, features, held_block);
    } else {
        packet.u8(SELF_ID);
    }
    if features.contains(FeatureSet::EXT_ENTITY_POSITIONS) {
        packet.i32(pos.x).i32(pos.y).i32(pos.z);
    } else {
        packet.i16(narrow(pos.x)).i16(narrow(pos.y)).i16(narrow(pos.z));
    }
    packet.u8(pos.yaw).u8(pos.pitch);
}

/// Append a block placement (`place`) or deletion.
pub fn set_block(
    buf: &mut SendBuffer,
    features: FeatureSet,
    coords: [i16; 3],
    place: bool,
    block_id: u16,
) {
    let mut packet = buf.packet(opcode::SET_BLOCK_CLIENT);
    packet
        .i16(coords[0])
        .i16(coords[1])
        .i16(coords[2])
        .u8(u8::from(place));
    block(&mut packet, features, block_id);
}

/// Append a `PlayerClick` report.
pub fn player_click(buf: &mut SendBuffer, click: PlayerClick) {
    buf.packet(opcode::PLAYER_CLICK)
        .u8(click.button)
        .u8(u8::from(click.released))
        .i16(click.yaw)
        .i16(click.pitch)
        .u8(click.target_entity)
        .i16(click.block[0])
        .i16(click.block[1])
        .i16(click.block[2])
        .u8(click.face);
}

/// Append a `TwoWayPing`. `server_initiated` selects the echo direction.
pub fn two_way_ping(buf: &mut SendBuffer, server_initiated: bool, data: u16) {
    buf.packet(opcode::TWO_WAY_PING)
        .u8(u8::from(server_initiated))
        .u16(data);
}

/// Block ids are one byte unless `ExtendedBlocks` was negotiated; ids that do
/// not fit a byte are sent as air.
fn block(packet: &mut PacketWriter<'_>, features: FeatureSet, id: u16) {
    if features.contains(FeatureSet::EXTENDED_BLOCKS) {
        packet.u16(id);
    } else {
        packet.u8(u8::try_from(id).unwrap_or(0));
    }
}

fn narrow(value: i32) -> i16 {
    i16::try_from(value).unwrap_or(if value < 0 { i16::MIN } else { i16::MAX })
}
