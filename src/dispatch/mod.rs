//! Byte-indexed opcode dispatch table.
//!
//! One slot per possible opcode byte holds the registered handler and the
//! fixed payload size. Sizes start at the baseline given to
//! [`OpcodeTable::register`] and only grow through capability negotiation.

use std::fmt;

use crate::{codec::Session, error::PacketError, error::RegistrationError};

pub mod opcode;

/// Handler invoked with the exact payload of one packet.
pub type PacketHandler<C> = fn(&mut Session<'_, C>, &[u8]) -> Result<(), PacketError>;

/// Handler and payload size for one opcode.
pub struct Slot<C> {
    handler: Option<PacketHandler<C>>,
    size: u16,
}

impl<C> Slot<C> {
    const EMPTY: Self = Self {
        handler: None,
        size: 0,
    };

    /// Registered handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<PacketHandler<C>> { self.handler }

    /// Payload size, excluding the opcode byte.
    #[must_use]
    pub fn size(&self) -> u16 { self.size }

    /// Bytes the whole packet occupies on the wire.
    #[must_use]
    pub fn frame_len(&self) -> usize { 1 + usize::from(self.size) }
}

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self { *self }
}

impl<C> Copy for Slot<C> {}

impl<C> fmt::Debug for Slot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("registered", &self.handler.is_some())
            .field("size", &self.size)
            .finish()
    }
}

/// Flat 256-entry table of opcode slots.
pub struct OpcodeTable<C> {
    slots: [Slot<C>; 256],
    highest: u8,
}

impl<C> Default for OpcodeTable<C> {
    fn default() -> Self {
        Self {
            slots: [Slot::EMPTY; 256],
            highest: 0,
        }
    }
}

impl<C> fmt::Debug for OpcodeTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeTable")
            .field("highest", &self.highest)
            .field("registered", &self.registered().count())
            .finish_non_exhaustive()
    }
}

impl<C> OpcodeTable<C> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Associate `handler` and a baseline payload size with `opcode`.
    ///
    /// Re-registering replaces both the handler and the size.
    pub fn register(&mut self, opcode: u8, handler: PacketHandler<C>, size: u16) {
        self.slots[usize::from(opcode)] = Slot {
            handler: Some(handler),
            size,
        };
        self.highest = self.highest.max(opcode);
    }

    /// Grow the payload size of `opcode` by `delta`.
    ///
    /// Only capability negotiation may call this; growth is additive.
    pub(crate) fn grow_size(&mut self, opcode: u8, delta: u16) {
        let slot = &mut self.slots[usize::from(opcode)];
        slot.size = slot.size.saturating_add(delta);
    }

    /// Look up the slot for `opcode`.
    ///
    /// Returns `None` for opcodes above the highest registered opcode without
    /// probing the table.
    #[must_use]
    pub fn lookup(&self, opcode: u8) -> Option<Slot<C>> {
        if opcode > self.highest {
            return None;
        }
        Some(self.slots[usize::from(opcode)])
    }

    /// Whether `opcode` has a handler.
    #[must_use]
    pub fn is_registered(&self, opcode: u8) -> bool {
        self.slots[usize::from(opcode)].handler.is_some()
    }

    /// Current payload size of `opcode`.
    #[must_use]
    pub fn size(&self, opcode: u8) -> u16 { self.slots[usize::from(opcode)].size }

    /// Highest opcode registered since the last [`clear`](Self::clear).
    #[must_use]
    pub fn highest(&self) -> u8 { self.highest }

    /// Opcodes that currently have a handler.
    pub fn registered(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|&op| self.is_registered(op))
    }

    /// Reset every slot to empty and the watermark to zero.
    pub fn clear(&mut self) {
        self.slots = [Slot::EMPTY; 256];
        self.highest = 0;
    }

    /// Check that every opcode reachable under negotiation has a handler.
    ///
    /// Each item pairs an opcode with the capability that references it.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] for the first opcode without a handler.
    pub fn ensure_registered<I>(&self, reachable: I) -> Result<(), RegistrationError>
    where
        I: IntoIterator<Item = (u8, &'static str)>,
    {
        match reachable
            .into_iter()
            .find(|(opcode, _)| !self.is_registered(*opcode))
        {
            Some((opcode, capability)) => Err(RegistrationError { opcode, capability }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests;
