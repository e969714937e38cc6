//! Outbound packet buffer.
//!
//! Writers append whole packets through [`PacketWriter`]. A flush hands the
//! buffer to the socket in one go and always leaves it empty afterwards: bytes
//! that could not be written are dropped rather than queued, so a stalled
//! send never holds back later keepalive or chat traffic.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};

use crate::{
    byte_order::{write_network_i16, write_network_i32, write_network_u16},
    codec::cp437,
};

/// Pending outbound bytes.
#[derive(Debug, Default)]
pub struct SendBuffer {
    data: BytesMut,
    packets: usize,
}

/// What a [`SendBuffer::flush`] did with the pending bytes.
#[derive(Debug)]
pub enum FlushOutcome {
    /// Nothing was pending.
    Empty,
    /// Every pending byte was written.
    Sent {
        /// Bytes written.
        bytes: usize,
        /// Packets written.
        packets: usize,
    },
    /// The socket could not accept the bytes now; they were dropped.
    Dropped {
        /// Bytes discarded.
        bytes: usize,
        /// Packets discarded (possibly partially written).
        packets: usize,
    },
    /// The transport reported a hard error; the bytes were dropped.
    Failed {
        /// Bytes discarded.
        bytes: usize,
        /// Packets discarded (possibly partially written).
        packets: usize,
        /// Error reported by the transport.
        error: io::Error,
    },
}

impl SendBuffer {
    /// Create an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            packets: 0,
        }
    }

    /// Pending byte count.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// True when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Number of packets appended since the last flush.
    #[must_use]
    pub fn pending_packets(&self) -> usize { self.packets }

    /// Pending bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.data }

    /// Begin a packet with the given opcode.
    ///
    /// The returned writer appends fields directly after the opcode byte.
    pub fn packet(&mut self, opcode: u8) -> PacketWriter<'_> {
        self.packets += 1;
        self.data.put_u8(opcode);
        PacketWriter { buf: &mut self.data }
    }

    /// Drop pending bytes without writing them.
    pub fn clear(&mut self) {
        self.data.clear();
        self.packets = 0;
    }

    /// Write every pending byte to `sink` and reset the buffer.
    ///
    /// The buffer is empty afterwards whatever the outcome.
    pub fn flush<W: Write + ?Sized>(&mut self, sink: &mut W) -> FlushOutcome {
        if self.data.is_empty() {
            return FlushOutcome::Empty;
        }
        let bytes = self.data.len();
        let packets = self.packets;
        let outcome = match write_all_nonblocking(sink, &self.data) {
            Ok(()) => FlushOutcome::Sent { bytes, packets },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                FlushOutcome::Dropped { bytes, packets }
            }
            Err(error) => FlushOutcome::Failed {
                bytes,
                packets,
                error,
            },
        };
        self.clear();
        outcome
    }
}

fn write_all_nonblocking<W: Write + ?Sized>(sink: &mut W, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match sink.write(buf) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "socket accepted zero bytes",
                ));
            }
            Ok(written) => buf = &buf[written..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    sink.flush()
}

/// Field writer for one outbound packet.
#[derive(Debug)]
pub struct PacketWriter<'a> {
    buf: &'a mut BytesMut,
}

impl PacketWriter<'_> {
    /// Append one byte.
    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.put_u8(value);
        self
    }

    /// Append a big-endian `u16`.
    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.put_slice(&write_network_u16(value));
        self
    }

    /// Append a big-endian `i16`.
    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.buf.put_slice(&write_network_i16(value));
        self
    }

    /// Append a big-endian `i32`.
    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_slice(&write_network_i32(value));
        self
    }

    /// Append raw bytes.
    pub fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.put_slice(value);
        self
    }

    /// Append a 64-byte padded string. `full_cp437` allows upper-half glyphs.
    pub fn string(&mut self, text: &str, full_cp437: bool) -> &mut Self {
        self.buf.put_slice(&cp437::encode_padded(text, full_cp437));
        self
    }
}
