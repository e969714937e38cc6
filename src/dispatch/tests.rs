//! Tests for the opcode table.

use rstest::{fixture, rstest};

use super::*;

fn noop(_: &mut Session<'_, ()>, _: &[u8]) -> Result<(), PacketError> { Ok(()) }

#[fixture]
fn table() -> OpcodeTable<()> {
    let mut table = OpcodeTable::new();
    table.register(opcode::HANDSHAKE, noop, 130);
    table.register(opcode::ENTITY_TELEPORT, noop, 9);
    table
}

#[rstest]
fn registration_raises_watermark(table: OpcodeTable<()>) {
    assert_eq!(table.highest(), opcode::ENTITY_TELEPORT);
    assert_eq!(table.registered().collect::<Vec<_>>(), vec![0, 8]);
}

#[rstest]
fn lookup_rejects_opcodes_above_watermark(table: OpcodeTable<()>) {
    assert!(table.lookup(9).is_none());
    assert!(table.lookup(0xFF).is_none());
}

#[rstest]
fn lookup_returns_empty_slots_below_watermark(table: OpcodeTable<()>) {
    let slot = table.lookup(opcode::LEVEL_INIT).expect("within watermark");
    assert!(slot.handler().is_none());
    let slot = table.lookup(opcode::ENTITY_TELEPORT).expect("registered");
    assert!(slot.handler().is_some());
    assert_eq!(slot.frame_len(), 10);
}

#[rstest]
fn growth_is_additive(mut table: OpcodeTable<()>) {
    table.grow_size(opcode::ENTITY_TELEPORT, 6);
    table.grow_size(opcode::ENTITY_TELEPORT, 2);
    assert_eq!(table.size(opcode::ENTITY_TELEPORT), 17);
}

#[rstest]
fn clear_resets_slots_and_watermark(mut table: OpcodeTable<()>) {
    table.clear();
    assert_eq!(table.highest(), 0);
    assert_eq!(table.registered().count(), 0);
    assert_eq!(table.size(opcode::HANDSHAKE), 0);
}

#[rstest]
fn ensure_registered_names_first_missing_opcode(table: OpcodeTable<()>) {
    assert!(table.ensure_registered([(8, "ExtEntityPositions")]).is_ok());
    let err = table
        .ensure_registered([(8, "ExtEntityPositions"), (7, "ExtEntityPositions"), (2, "FastMap")])
        .expect_err("AddEntity is missing");
    assert_eq!(
        err,
        RegistrationError {
            opcode: 7,
            capability: "ExtEntityPositions"
        }
    );
}

#[test]
fn standard_sizes_cover_server_opcodes_only() {
    assert_eq!(opcode::baseline_size(opcode::HANDSHAKE), Some(130));
    assert_eq!(opcode::baseline_size(opcode::BULK_BLOCK_UPDATE), Some(1281));
    assert_eq!(opcode::baseline_size(opcode::SET_BLOCK_CLIENT), None);
    assert_eq!(opcode::baseline_size(opcode::PLAYER_CLICK), None);
    assert_eq!(opcode::name(opcode::HACK_CONTROL), "HackControl");
}
