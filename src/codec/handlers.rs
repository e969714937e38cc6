//! Handlers the engine registers for every codec.
//!
//! These cover the packets the engine itself depends on: the server handshake,
//! keepalives, kicks, capability negotiation and two-way pings.

use tracing::{debug, info};

use super::{PacketReader, ProtocolCodec, Session, writer};
use crate::{
    dispatch::{OpcodeTable, PacketHandler, opcode},
    error::{DisconnectReason, PacketError},
    extension::EntryOutcome,
};

/// User type byte marking an operator in the server handshake.
const OPERATOR: u8 = 0x64;
/// App-name prefix of legacy D3 servers.
const D3_PREFIX: &str = "D3 server";

/// Register the engine's handlers at their baseline sizes.
pub fn register<C: ProtocolCodec>(table: &mut OpcodeTable<C>) {
    let core: [(u8, PacketHandler<C>); 6] = [
        (opcode::HANDSHAKE, handshake::<C>),
        (opcode::PING, ping::<C>),
        (opcode::KICK, kick::<C>),
        (opcode::EXT_INFO, ext_info::<C>),
        (opcode::EXT_ENTRY, ext_entry::<C>),
        (opcode::TWO_WAY_PING, two_way_ping::<C>),
    ];
    for (op, handler) in core {
        table.register(op, handler, opcode::baseline_size(op).unwrap_or(0));
    }
}

fn handshake<C>(session: &mut Session<'_, C>, payload: &[u8]) -> Result<(), PacketError> {
    let mut reader = PacketReader::new(payload);
    let version = reader.u8()?;
    let name = reader.string()?;
    let motd = reader.string()?;
    let user_type = reader.u8()?;
    info!(version, server = %name, motd = %motd, "server identified");
    let state = session.state_mut();
    state.server_name = name;
    state.motd = motd;
    state.operator = user_type == OPERATOR;
    Ok(())
}

fn ping<C>(_session: &mut Session<'_, C>, _payload: &[u8]) -> Result<(), PacketError> { Ok(()) }

fn kick<C>(session: &mut Session<'_, C>, payload: &[u8]) -> Result<(), PacketError> {
    let reason = PacketReader::new(payload).string()?;
    info!(reason = %reason, "kicked by server");
    session.request_disconnect(DisconnectReason::kicked(reason));
    Ok(())
}

fn ext_info<C>(session: &mut Session<'_, C>, payload: &[u8]) -> Result<(), PacketError> {
    let mut reader = PacketReader::new(payload);
    let app_name = reader.string()?;
    let count = reader.i16()?;
    if is_d3_server(&app_name) {
        debug!(app = %app_name, "enabling stray HackControl byte workaround");
        session.state_mut().needs_d3_fix = true;
    }
    session
        .registry
        .begin(app_name, u16::try_from(count).unwrap_or(0));
    session.reply_if_negotiated();
    Ok(())
}

fn ext_entry<C>(session: &mut Session<'_, C>, payload: &[u8]) -> Result<(), PacketError> {
    let mut reader = PacketReader::new(payload);
    let name = reader.string()?;
    let version = reader.i32()?;
    if session.accept_capability(&name, version) == EntryOutcome::Duplicate {
        session.warn(&format!("Server announced {name} twice"));
    }
    session.reply_if_negotiated();
    Ok(())
}

fn two_way_ping<C>(session: &mut Session<'_, C>, payload: &[u8]) -> Result<(), PacketError> {
    let mut reader = PacketReader::new(payload);
    let server_initiated = reader.u8()? != 0;
    let data = reader.u16()?;
    if server_initiated {
        writer::two_way_ping(session.outbound(), true, data);
    } else {
        let now = session.now();
        if !session.state_mut().pings.update(data, now) {
            debug!(data, "ignoring unmatched ping reply");
        }
    }
    Ok(())
}

fn is_d3_server(app_name: &str) -> bool {
    app_name
        .get(..D3_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(D3_PREFIX))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::exact("D3 server 1.2", true)]
    #[case::lowercase("d3 SERVER", true)]
    #[case::other("MCGalaxy 1.9", false)]
    #[case::short("D3", false)]
    fn recognises_d3_servers(#[case] app: &str, #[case] expected: bool) {
        assert_eq!(is_d3_server(app), expected);
    }
}
