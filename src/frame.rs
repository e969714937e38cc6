//! Byte-level framing: the inbound reassembly buffer and the outbound send
//! buffer.

pub mod receive;
pub mod send;

pub use receive::{Ingest, ReceiveBuffer};
pub use send::{FlushOutcome, PacketWriter, SendBuffer};
