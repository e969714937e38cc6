//! Connection phase and per-session state.

use crate::{error::DisconnectReason, ping::PingList};

/// Lifecycle phase of a [`Connection`](super::Connection).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No socket.
    #[default]
    Disconnected,
    /// Waiting for the TCP connect to finish.
    Connecting,
    /// Connected; the login packet is waiting for a writable socket.
    Handshaking,
    /// Exchanging packets.
    Active,
}

/// Default jump velocity of the local player.
pub const DEFAULT_JUMP_VELOCITY: f32 = 0.42;

/// Gameplay values the protocol layer may need to correct.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerTunables {
    /// Current jump velocity.
    pub jump_velocity: f32,
    /// Jump velocity last dictated by the server.
    pub server_jump_velocity: f32,
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self {
            jump_velocity: DEFAULT_JUMP_VELOCITY,
            server_jump_velocity: DEFAULT_JUMP_VELOCITY,
        }
    }
}

/// Per-session state owned by the connection and visible to handlers.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// Server name from the server handshake.
    pub server_name: String,
    /// Message of the day from the server handshake.
    pub motd: String,
    /// The local player is an operator.
    pub operator: bool,
    /// Opcode of the last dispatched packet.
    pub last_opcode: Option<u8>,
    /// The server is a legacy D3 build that sends a stray byte after
    /// `HackControl`.
    pub needs_d3_fix: bool,
    /// Player values corrected by the protocol layer.
    pub tunables: PlayerTunables,
    /// Outstanding two-way pings.
    pub pings: PingList,
    pub(crate) pending_disconnect: Option<DisconnectReason>,
}

impl SessionState {
    /// Return to the state of a fresh connection.
    pub fn reset(&mut self) { *self = Self::default(); }

    /// Forget what the server negotiated while keeping its identity and the
    /// player tunables.
    pub fn reset_negotiation(&mut self) {
        self.last_opcode = None;
        self.needs_d3_fix = false;
        self.pings.clear();
    }

    /// Disconnect requested by a handler and not yet carried out.
    #[must_use]
    pub fn pending_disconnect(&self) -> Option<&DisconnectReason> { self.pending_disconnect.as_ref() }
}
