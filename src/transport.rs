//! Non-blocking byte transport.
//!
//! [`Transport`] is the seam between the engine and the operating system.
//! [`TcpTransport`] starts a non-blocking TCP connect through `socket2` and
//! reports completion when polled; tests substitute scripted transports.

use std::{
    io::{self, Read, Write},
    mem::MaybeUninit,
    net::{Shutdown, SocketAddr},
};

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::client::SocketOptions;

/// Result of polling an in-progress connect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectPoll {
    /// The connection is established.
    Connected,
    /// The connect is still in flight.
    Pending,
}

/// A non-blocking, connection-oriented byte stream.
///
/// Reads and writes must return [`io::ErrorKind::WouldBlock`] instead of
/// blocking.
pub trait Transport: Read + Write {
    /// Check whether an in-flight connect finished.
    ///
    /// # Errors
    ///
    /// Returns the socket's pending error if the connect failed.
    fn poll_connect(&mut self) -> io::Result<ConnectPoll>;

    /// Check whether the peer is still there without consuming data.
    fn probe_alive(&mut self) -> bool;

    /// Close both directions. Errors are ignored; the transport is dropped
    /// afterwards.
    fn shutdown(&mut self);
}

/// TCP transport built on a non-blocking [`Socket`].
#[derive(Debug)]
pub struct TcpTransport {
    socket: Socket,
}

impl TcpTransport {
    /// Create a socket for `addr`, apply `options` and start connecting.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be created or configured, or if
    /// the connect fails immediately.
    pub fn connect(addr: SocketAddr, options: &SocketOptions) -> io::Result<Self> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_nonblocking(true)?;
        options.apply(&socket)?;
        match socket.connect(&SockAddr::from(addr)) {
            Ok(()) => {}
            Err(e) if is_in_progress(&e) => {}
            Err(e) => return Err(e),
        }
        Ok(Self { socket })
    }

    /// The underlying socket.
    #[must_use]
    pub fn socket(&self) -> &Socket { &self.socket }
}

fn is_in_progress(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    #[cfg(unix)]
    if error.raw_os_error() == Some(libc::EINPROGRESS) {
        return true;
    }
    false
}

impl Read for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> { (&self.socket).read(buf) }
}

impl Write for TcpTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { (&self.socket).write(buf) }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Transport for TcpTransport {
    fn poll_connect(&mut self) -> io::Result<ConnectPoll> {
        if let Some(error) = self.socket.take_error()? {
            return Err(error);
        }
        match self.socket.peer_addr() {
            Ok(_) => Ok(ConnectPoll::Connected),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(ConnectPoll::Pending),
            Err(e) => Err(e),
        }
    }

    fn probe_alive(&mut self) -> bool {
        let mut byte = [MaybeUninit::<u8>::uninit()];
        match self.socket.peek(&mut byte) {
            Ok(0) => false,
            Ok(_) => true,
            Err(e) => e.kind() == io::ErrorKind::WouldBlock,
        }
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.socket.shutdown(Shutdown::Both) {
            tracing::debug!(error = %e, "socket shutdown failed");
        }
    }
}
