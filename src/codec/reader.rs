//! Cursor over a single packet payload.

use super::cp437::{self, STRING_LENGTH};
use crate::{
    byte_order::{read_network_i16, read_network_i32, read_network_u16},
    error::PacketError,
};

/// Sequential field reader over one packet payload.
///
/// Handlers receive the exact payload slice for their opcode, so running
/// past the end means the registered size disagrees with the handler.
#[derive(Debug)]
pub struct PacketReader<'a> {
    payload: &'a [u8],
    offset: usize,
}

impl<'a> PacketReader<'a> {
    /// Wrap a payload slice.
    #[must_use]
    pub fn new(payload: &'a [u8]) -> Self { Self { payload, offset: 0 } }

    /// Bytes not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize { self.payload.len() - self.offset }

    /// Read `len` raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Truncated`] if fewer than `len` bytes remain.
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], PacketError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(PacketError::Truncated {
                needed: len,
                remaining,
            });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.payload[start..self.offset])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], PacketError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    /// Read one unsigned byte.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Truncated`] at the end of the payload.
    pub fn u8(&mut self) -> Result<u8, PacketError> { Ok(self.array::<1>()?[0]) }

    /// Read a big-endian `u16`.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Truncated`] at the end of the payload.
    pub fn u16(&mut self) -> Result<u16, PacketError> { Ok(read_network_u16(self.array()?)) }

    /// Read a big-endian `i16`.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Truncated`] at the end of the payload.
    pub fn i16(&mut self) -> Result<i16, PacketError> { Ok(read_network_i16(self.array()?)) }

    /// Read a big-endian `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Truncated`] at the end of the payload.
    pub fn i32(&mut self) -> Result<i32, PacketError> { Ok(read_network_i32(self.array()?)) }

    /// Read a 64-byte padded string.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Truncated`] if fewer than 64 bytes remain.
    pub fn string(&mut self) -> Result<String, PacketError> {
        Ok(cp437::decode_padded(self.bytes(STRING_LENGTH)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_in_order() {
        let mut payload = vec![0x07, 0xFF, 0xFE, 0x00, 0x00, 0x01, 0x00];
        payload.extend_from_slice(&cp437::encode_padded("hello", false));
        let mut reader = PacketReader::new(&payload);
        assert_eq!(reader.u8(), Ok(7));
        assert_eq!(reader.i16(), Ok(-2));
        assert_eq!(reader.i32(), Ok(256));
        assert_eq!(reader.string().as_deref(), Ok("hello"));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncation_reports_shortfall() {
        let mut reader = PacketReader::new(&[0x01]);
        assert_eq!(
            reader.i16(),
            Err(PacketError::Truncated {
                needed: 2,
                remaining: 1
            })
        );
    }
}
