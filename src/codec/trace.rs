//! A codec that accepts every standard packet and only observes it.

use tracing::trace;

use super::{PacketReader, ProtocolCodec, Session};
use crate::{
    dispatch::{OpcodeTable, PacketHandler, opcode},
    error::PacketError,
};

const MAX_MESSAGES: usize = 256;

/// Registers every standard server opcode with a handler that counts and
/// traces packets. Chat messages and the last level size are kept.
///
/// Useful for probing live servers and as a base for tests.
#[derive(Clone, Debug)]
pub struct TraceCodec {
    counts: [u64; 256],
    messages: Vec<String>,
    level_size: Option<[i16; 3]>,
}

impl Default for TraceCodec {
    fn default() -> Self {
        Self {
            counts: [0; 256],
            messages: Vec::new(),
            level_size: None,
        }
    }
}

impl TraceCodec {
    /// Create a codec with empty counters.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Packets seen per opcode. The engine's own opcodes are never counted.
    #[must_use]
    pub fn counts(&self) -> &[u64; 256] { &self.counts }

    /// Packets seen for `opcode`.
    #[must_use]
    pub fn count(&self, opcode: u8) -> u64 { self.counts[usize::from(opcode)] }

    /// Chat messages received, oldest first. Only the last 256 are kept.
    #[must_use]
    pub fn messages(&self) -> &[String] { &self.messages }

    /// Dimensions from the last `LevelFinalise`.
    #[must_use]
    pub fn level_size(&self) -> Option<[i16; 3]> { self.level_size }
}

impl ProtocolCodec for TraceCodec {
    fn register(&self, table: &mut OpcodeTable<Self>) {
        for &(op, size) in opcode::STANDARD {
            let handler: PacketHandler<Self> = match op {
                opcode::MESSAGE => message,
                opcode::LEVEL_FINALISE => level_finalise,
                _ => observe,
            };
            table.register(op, handler, size);
        }
    }

    fn reset(&mut self) { *self = Self::default(); }
}

fn observe(session: &mut Session<'_, TraceCodec>, payload: &[u8]) -> Result<(), PacketError> {
    let Some(op) = session.opcode() else {
        return Ok(());
    };
    trace!(
        opcode = op,
        name = opcode::name(op),
        len = payload.len(),
        "packet"
    );
    let count = &mut session.codec().counts[usize::from(op)];
    *count = count.saturating_add(1);
    Ok(())
}

fn message(session: &mut Session<'_, TraceCodec>, payload: &[u8]) -> Result<(), PacketError> {
    observe(session, payload)?;
    let mut reader = PacketReader::new(payload);
    let _kind = reader.u8()?;
    let text = reader.string()?;
    let messages = &mut session.codec().messages;
    if messages.len() == MAX_MESSAGES {
        messages.remove(0);
    }
    messages.push(text);
    Ok(())
}

fn level_finalise(
    session: &mut Session<'_, TraceCodec>,
    payload: &[u8],
) -> Result<(), PacketError> {
    observe(session, payload)?;
    let mut reader = PacketReader::new(payload);
    let size = [reader.i16()?, reader.i16()?, reader.i16()?];
    session.codec().level_size = Some(size);
    Ok(())
}
