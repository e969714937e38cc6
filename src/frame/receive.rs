//! Reassembly buffer for the inbound byte stream.
//!
//! Bytes arrive in arbitrary chunks. The dispatch loop consumes whole packets
//! from the read cursor and leaves partial packets in place until later ticks
//! complete them.

use std::io::{self, Read};

use bytes::BytesMut;

/// Result of draining a non-blocking source into the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ingest {
    /// Bytes appended during this call.
    pub bytes: usize,
    /// The source reported end of stream.
    pub eof: bool,
}

/// Growable byte accumulator with a read cursor.
///
/// Invariant: `cursor <= len`. After [`compact`](Self::compact) unread bytes
/// start at offset zero and the cursor is zero.
#[derive(Debug)]
pub struct ReceiveBuffer {
    data: BytesMut,
    cursor: usize,
    read_chunk: usize,
}

impl ReceiveBuffer {
    /// Create an empty buffer.
    ///
    /// `read_chunk` is the size of each read issued against the socket.
    #[must_use]
    pub fn with_capacity(capacity: usize, read_chunk: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            cursor: 0,
            read_chunk: read_chunk.max(1),
        }
    }

    /// Total bytes written into the buffer (read and unread).
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Current read cursor.
    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    /// Bytes available to consume.
    #[must_use]
    pub fn remaining(&self) -> usize { self.data.len() - self.cursor }

    /// True when no unread bytes remain.
    #[must_use]
    pub fn is_drained(&self) -> bool { self.remaining() == 0 }

    /// Unread bytes starting at the cursor.
    #[must_use]
    pub fn unread(&self) -> &[u8] { &self.data[self.cursor..] }

    /// Byte at the cursor, if any.
    #[must_use]
    pub fn peek(&self) -> Option<u8> { self.data.get(self.cursor).copied() }

    /// Append bytes that were obtained elsewhere.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) { self.data.extend_from_slice(bytes); }

    /// Advance the cursor past `count` bytes, clamped to the write length.
    pub fn consume(&mut self, count: usize) {
        debug_assert!(count <= self.remaining(), "consumed past write length");
        self.cursor = (self.cursor + count).min(self.data.len());
    }

    /// Move unread bytes to the front and reset the cursor.
    pub fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let len = self.data.len();
        self.data.copy_within(self.cursor..len, 0);
        self.data.truncate(len - self.cursor);
        self.cursor = 0;
    }

    /// Discard all content, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
        self.cursor = 0;
    }

    /// Read from a non-blocking source until it would block.
    ///
    /// Zero bytes available is not an error. A zero-length read marks end of
    /// stream; bytes read before it stay buffered.
    ///
    /// # Errors
    ///
    /// Returns any read error other than `WouldBlock` or `Interrupted`.
    pub fn fill_from<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<Ingest> {
        let mut ingest = Ingest::default();
        loop {
            let start = self.data.len();
            self.data.resize(start + self.read_chunk, 0);
            match source.read(&mut self.data[start..]) {
                Ok(0) => {
                    self.data.truncate(start);
                    ingest.eof = true;
                    return Ok(ingest);
                }
                Ok(read) => {
                    self.data.truncate(start + read);
                    ingest.bytes += read;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => self.data.truncate(start),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.data.truncate(start);
                    return Ok(ingest);
                }
                Err(e) => {
                    self.data.truncate(start);
                    return Err(e);
                }
            }
        }
    }
}
