use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, Read, Write},
    rc::Rc,
};

use classicwire::transport::{ConnectPoll, Transport};

/// One scripted result of a read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundStep {
    /// Bytes to hand out, possibly over several reads.
    Data(Vec<u8>),
    /// A single `WouldBlock`, ending the current tick's reads.
    WouldBlock,
    /// End of stream. Every later read also returns zero.
    Eof,
    /// A hard read error.
    Error(io::ErrorKind),
}

/// How writes behave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Accept everything.
    #[default]
    Accept,
    /// Accept at most this many bytes per call.
    Limit(usize),
    /// Refuse with `WouldBlock`.
    WouldBlock,
    /// Fail with the given error.
    Error(io::ErrorKind),
}

#[derive(Debug, Default)]
struct Script {
    pending_polls: usize,
    connect_error: Option<io::ErrorKind>,
    inbound: VecDeque<InboundStep>,
    written: Vec<u8>,
    write_mode: WriteMode,
    dead: bool,
    probes: usize,
    shut_down: bool,
}

/// In-memory [`Transport`] driven by a script.
///
/// Clones share one script, so a test can keep a handle after moving the
/// transport into a connection. Reads with nothing scripted return
/// `WouldBlock`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    /// A transport whose connect completes on the first poll.
    #[must_use]
    pub fn connected() -> Self { Self::default() }

    /// A transport whose connect stays pending for `polls` polls.
    #[must_use]
    pub fn pending_for(polls: usize) -> Self {
        let transport = Self::default();
        transport.script.borrow_mut().pending_polls = polls;
        transport
    }

    /// A transport whose connect fails with `kind` on the first poll.
    #[must_use]
    pub fn refusing(kind: io::ErrorKind) -> Self {
        let transport = Self::default();
        transport.script.borrow_mut().connect_error = Some(kind);
        transport
    }

    /// Queue bytes followed by a `WouldBlock`, i.e. one tick's worth of data.
    pub fn push_inbound(&self, bytes: impl Into<Vec<u8>>) {
        let mut script = self.script.borrow_mut();
        script.inbound.push_back(InboundStep::Data(bytes.into()));
        script.inbound.push_back(InboundStep::WouldBlock);
    }

    /// Queue a raw step.
    pub fn push_step(&self, step: InboundStep) { self.script.borrow_mut().inbound.push_back(step); }

    /// Queue end of stream.
    pub fn push_eof(&self) { self.push_step(InboundStep::Eof); }

    /// Change how writes behave.
    pub fn set_write_mode(&self, mode: WriteMode) { self.script.borrow_mut().write_mode = mode; }

    /// Make liveness probes fail.
    pub fn kill(&self) { self.script.borrow_mut().dead = true; }

    /// Every byte written so far.
    #[must_use]
    pub fn written(&self) -> Vec<u8> { self.script.borrow().written.clone() }

    /// Take the bytes written so far.
    #[must_use]
    pub fn take_written(&self) -> Vec<u8> { std::mem::take(&mut self.script.borrow_mut().written) }

    /// Liveness probes performed.
    #[must_use]
    pub fn probes(&self) -> usize { self.script.borrow().probes }

    /// Whether the connection shut the transport down.
    #[must_use]
    pub fn is_shut_down(&self) -> bool { self.script.borrow().shut_down }
}

impl Read for ScriptedTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut script = self.script.borrow_mut();
        match script.inbound.pop_front() {
            None | Some(InboundStep::WouldBlock) => Err(io::ErrorKind::WouldBlock.into()),
            Some(InboundStep::Eof) => {
                script.inbound.push_front(InboundStep::Eof);
                Ok(0)
            }
            Some(InboundStep::Error(kind)) => Err(kind.into()),
            Some(InboundStep::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    script.inbound.push_front(InboundStep::Data(rest));
                }
                Ok(n)
            }
        }
    }
}

impl Write for ScriptedTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut script = self.script.borrow_mut();
        match script.write_mode {
            WriteMode::Accept => {
                script.written.extend_from_slice(buf);
                Ok(buf.len())
            }
            WriteMode::Limit(max) => {
                let n = buf.len().min(max);
                script.written.extend_from_slice(&buf[..n]);
                Ok(n)
            }
            WriteMode::WouldBlock => Err(io::ErrorKind::WouldBlock.into()),
            WriteMode::Error(kind) => Err(kind.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Transport for ScriptedTransport {
    fn poll_connect(&mut self) -> io::Result<ConnectPoll> {
        let mut script = self.script.borrow_mut();
        if let Some(kind) = script.connect_error {
            return Err(kind.into());
        }
        if script.pending_polls > 0 {
            script.pending_polls -= 1;
            return Ok(ConnectPoll::Pending);
        }
        Ok(ConnectPoll::Connected)
    }

    fn probe_alive(&mut self) -> bool {
        let mut script = self.script.borrow_mut();
        script.probes += 1;
        !script.dead
    }

    fn shutdown(&mut self) { self.script.borrow_mut().shut_down = true; }
}
