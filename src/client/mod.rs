//! Tick-driven game client.
//!
//! A [`Connection`] owns the socket, the receive and send buffers, the opcode
//! table and the negotiated capability state. The host calls
//! [`Connection::tick`] from its scheduler; every step is non-blocking.

mod active;
mod builder;
mod config;
mod connection;
mod state;

pub use builder::ConnectionBuilder;
pub use config::{ClientConfig, SocketOptions};
pub use connection::Connection;
pub use state::{DEFAULT_JUMP_VELOCITY, Phase, PlayerTunables, SessionState};

#[cfg(test)]
mod tests;
