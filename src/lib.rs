#![doc(html_root_url = "https://docs.rs/classicwire/latest")]
//! Public API for the `classicwire` library.
//!
//! This crate implements the client side of a block-game network protocol:
//! fixed-size opcode framing, a pluggable opcode table, capability
//! negotiation that grows packet sizes, and a tick-driven connection engine
//! over a non-blocking socket.

pub mod byte_order;
pub mod client;
pub mod clock;
pub mod codec;
pub mod dispatch;
pub mod download;
pub mod error;
pub mod extension;
pub mod frame;
pub mod hooks;
pub mod metrics;
pub mod ping;
pub mod transport;

pub use client::{ClientConfig, Connection, ConnectionBuilder, Phase, SessionState, SocketOptions};
pub use codec::{PacketReader, ProtocolCodec, Session, TraceCodec};
pub use dispatch::{OpcodeTable, PacketHandler};
pub use error::{ConnectError, DisconnectReason, PacketError, ProtocolViolation, RegistrationError};
pub use extension::{CapabilityRegistry, Catalog, FeatureSet};
pub use hooks::ClientEvents;
pub use metrics::{CONNECTIONS_ACTIVE, Direction, ERRORS_TOTAL, PACKETS_PROCESSED};
pub use transport::{ConnectPoll, TcpTransport, Transport};
