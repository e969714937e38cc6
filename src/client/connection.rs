//! Connection lifecycle: connect, handshake, disconnect and outbound helpers.

use std::{
    net::SocketAddr,
    time::{Duration, Instant, SystemTime},
};

use tracing::{debug, error, info, warn};

use super::{ClientConfig, Phase, SessionState};
use crate::{
    clock::Clock,
    codec::{
        ProtocolCodec,
        Session,
        cp437::STRING_LENGTH,
        handlers,
        writer::{self, PlayerClick, PlayerPosition},
    },
    dispatch::OpcodeTable,
    download::{self, DownloadRequest, Downloader},
    error::{ConnectError, DisconnectReason, ProtocolViolation, RegistrationError},
    extension::{CapabilityRegistry, Catalog, FeatureSet},
    frame::{FlushOutcome, ReceiveBuffer, SendBuffer},
    hooks::ClientEvents,
    metrics::{self, Direction, ErrorKind},
    transport::{ConnectPoll, TcpTransport, Transport},
};

/// Everything a handler may touch, grouped so the dispatch loop can lend it out
/// while the receive buffer stays borrowed.
pub(super) struct Engine<C> {
    pub(super) codec: C,
    pub(super) table: OpcodeTable<C>,
    pub(super) registry: CapabilityRegistry,
    pub(super) catalog: Catalog,
    pub(super) config: ClientConfig,
    pub(super) state: SessionState,
    pub(super) send: SendBuffer,
    pub(super) downloads: Box<dyn Downloader>,
}

impl<C: ProtocolCodec> Engine<C> {
    pub(super) fn session<'a>(
        &'a mut self,
        opcode: Option<u8>,
        now: Instant,
        events: &'a mut dyn ClientEvents,
    ) -> Session<'a, C> {
        Session {
            opcode,
            now,
            codec: &mut self.codec,
            table: &mut self.table,
            registry: &mut self.registry,
            catalog: &self.catalog,
            config: &self.config,
            state: &mut self.state,
            outbound: &mut self.send,
            events,
            downloads: &mut *self.downloads,
        }
    }

    /// Rebuild negotiation state and the opcode table from scratch. Server
    /// identity and tunables are left alone.
    fn reset_protocol(&mut self) -> Result<(), RegistrationError> {
        self.catalog = self.codec.catalog();
        self.codec.reset();
        self.state.reset_negotiation();
        self.registry.reset(&self.catalog);
        self.table.clear();
        self.codec.register(&mut self.table);
        handlers::register(&mut self.table);
        self.table.ensure_registered(self.catalog.resized_opcodes())
    }
}

/// One client session with a game server.
///
/// The connection is driven entirely by [`tick`](Self::tick); nothing blocks
/// and no background threads are used. It is reused across reconnects.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use classicwire::{ConnectionBuilder, Phase, TraceCodec};
///
/// let mut connection = ConnectionBuilder::new(TraceCodec::new())
///     .username("alice")
///     .build();
/// connection.begin_connect("127.0.0.1:25565".parse().expect("address"));
/// while connection.phase() != Phase::Disconnected {
///     connection.tick(Duration::from_millis(16));
///     std::thread::sleep(Duration::from_millis(16));
/// }
/// ```
pub struct Connection<C, E = (), T = TcpTransport> {
    pub(super) engine: Engine<C>,
    pub(super) recv: ReceiveBuffer,
    pub(super) events: E,
    pub(super) transport: Option<T>,
    pub(super) clock: Box<dyn Clock>,
    pub(super) phase: Phase,
    pub(super) remote: Option<SocketAddr>,
    pub(super) connect_deadline: Instant,
    pub(super) last_packet: Instant,
    pub(super) idle_accumulator: Duration,
    pub(super) net_ticks: u64,
    pub(super) maintenance_cycles: u64,
    pub(super) write_failed: bool,
    pub(super) edits_subscribed: bool,
    pub(super) last_disconnect: Option<DisconnectReason>,
}

impl<C, E, T> Connection<C, E, T> {
    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase { self.phase }

    /// Remote endpoint of the current or last attempt.
    #[must_use]
    pub fn remote(&self) -> Option<SocketAddr> { self.remote }

    /// The event receiver.
    #[must_use]
    pub fn events(&self) -> &E { &self.events }

    /// Mutable access to the event receiver.
    pub fn events_mut(&mut self) -> &mut E { &mut self.events }

    /// The protocol codec.
    #[must_use]
    pub fn codec(&self) -> &C { &self.engine.codec }

    /// Mutable access to the protocol codec.
    pub fn codec_mut(&mut self) -> &mut C { &mut self.engine.codec }

    /// Connection settings.
    #[must_use]
    pub fn config(&self) -> &ClientConfig { &self.engine.config }

    /// Negotiation state.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry { &self.engine.registry }

    /// Features negotiated so far.
    #[must_use]
    pub fn features(&self) -> FeatureSet { self.engine.registry.features() }

    /// The opcode table in use.
    #[must_use]
    pub fn table(&self) -> &OpcodeTable<C> { &self.engine.table }

    /// Session state.
    #[must_use]
    pub fn state(&self) -> &SessionState { &self.engine.state }

    /// Mutable session state, for the game layer to update tunables.
    pub fn state_mut(&mut self) -> &mut SessionState { &mut self.engine.state }

    /// Reason the last connection ended.
    #[must_use]
    pub fn last_disconnect(&self) -> Option<&DisconnectReason> { self.last_disconnect.as_ref() }

    /// Bytes received but not yet dispatched.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize { self.recv.remaining() }

    /// Bytes queued for the next flush.
    #[must_use]
    pub fn pending_send_bytes(&self) -> usize { self.engine.send.len() }

    /// Whether outbound world edits are currently turned into packets.
    #[must_use]
    pub fn is_subscribed_to_edits(&self) -> bool { self.edits_subscribed }

    /// The transport, while one is open.
    #[must_use]
    pub fn transport(&self) -> Option<&T> { self.transport.as_ref() }
}

impl<C: ProtocolCodec, E: ClientEvents> Connection<C, E, TcpTransport> {
    /// Start a non-blocking TCP connect to `addr`.
    ///
    /// An immediate socket error is reported through
    /// [`ClientEvents::disconnected`] like any other connect failure.
    pub fn begin_connect(&mut self, addr: SocketAddr) {
        match TcpTransport::connect(addr, &self.engine.config.socket) {
            Ok(transport) => self.begin_connect_with(addr, transport),
            Err(source) => {
                self.start_attempt(addr);
                self.fail_connect(&ConnectError::Socket { addr, source });
            }
        }
    }
}

impl<C: ProtocolCodec, E: ClientEvents, T: Transport> Connection<C, E, T> {
    /// Start a session over a transport whose connect is already in flight.
    pub fn begin_connect_with(&mut self, addr: SocketAddr, transport: T) {
        self.start_attempt(addr);
        self.transport = Some(transport);
    }

    fn start_attempt(&mut self, addr: SocketAddr) {
        if self.phase != Phase::Disconnected {
            warn!(%addr, phase = ?self.phase, "new connect attempt replaces live connection");
            self.disconnect(DisconnectReason::replaced(addr));
        }
        let now = self.clock.now();
        info!(%addr, "connecting");
        self.remote = Some(addr);
        self.phase = Phase::Connecting;
        self.connect_deadline = now + self.engine.config.connect_timeout;
        self.edits_subscribed = true;
        self.write_failed = false;
        self.last_disconnect = None;
    }

    /// Advance the connection by one scheduler tick of length `interval`.
    pub fn tick(&mut self, interval: Duration) {
        match self.phase {
            Phase::Disconnected => {}
            Phase::Connecting => self.tick_connecting(),
            Phase::Handshaking => self.tick_handshaking(),
            Phase::Active => self.tick_active(interval),
        }
    }

    fn tick_connecting(&mut self) {
        let now = self.clock.now();
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let Some(addr) = self.remote else {
            return;
        };
        match transport.poll_connect() {
            Err(source) => self.fail_connect(&ConnectError::Socket { addr, source }),
            Ok(ConnectPoll::Connected) => self.finish_connect(now),
            Ok(ConnectPoll::Pending) if now > self.connect_deadline => {
                let timeout = self.engine.config.connect_timeout;
                self.fail_connect(&ConnectError::Timeout { addr, timeout });
            }
            Ok(ConnectPoll::Pending) => {
                let timeout = self.engine.config.connect_timeout.as_secs_f32();
                let left = self.connect_deadline.saturating_duration_since(now).as_secs_f32();
                let remaining = if timeout > 0.0 { (left / timeout).clamp(0.0, 1.0) } else { 0.0 };
                self.events.connect_progress(remaining);
            }
        }
    }

    fn tick_handshaking(&mut self) {
        let now = self.clock.now();
        match self.remote {
            Some(addr) if now > self.connect_deadline => {
                let timeout = self.engine.config.connect_timeout;
                self.fail_connect(&ConnectError::Timeout { addr, timeout });
            }
            _ => self.send_login(now),
        }
    }

    fn fail_connect(&mut self, error: &ConnectError) {
        warn!(error = %error, "connect failed");
        metrics::inc_errors(ErrorKind::Connect);
        let Some(addr) = self.remote else {
            return;
        };
        self.disconnect(DisconnectReason::connect_failed(addr));
    }

    fn finish_connect(&mut self, now: Instant) {
        self.phase = Phase::Handshaking;
        self.events.connect_progress(0.0);
        self.recv.clear();
        self.engine.send.clear();
        self.engine.state.reset();
        if let Err(e) = self.engine.reset_protocol() {
            error!(opcode = e.opcode, capability = e.capability, "incomplete handler registration");
            metrics::inc_errors(ErrorKind::Protocol);
            self.disconnect(DisconnectReason::protocol(&e));
            return;
        }
        self.send_login(now);
    }

    /// Write the login packet. A socket that cannot take it yet keeps the
    /// connection in [`Phase::Handshaking`] and the next tick tries again.
    fn send_login(&mut self, now: Instant) {
        let config = &self.engine.config;
        writer::login(
            &mut self.engine.send,
            &config.username,
            &config.mppass,
            config.extensions,
        );
        if let FlushOutcome::Dropped { .. } = self.flush() {
            debug!(remote = ?self.remote, "login not written; retrying next tick");
            return;
        }
        self.last_packet = now;
        self.idle_accumulator = Duration::ZERO;
        self.net_ticks = 0;
        self.maintenance_cycles = 0;
        self.phase = Phase::Active;
        metrics::inc_connections();
        info!(remote = ?self.remote, "connected");
    }

    /// End the connection and report `reason` once.
    ///
    /// Calling this again, or while already disconnected, does nothing.
    pub fn disconnect(&mut self, reason: DisconnectReason) {
        if self.phase == Phase::Disconnected {
            return;
        }
        if self.phase == Phase::Active {
            metrics::dec_connections();
        }
        self.close_transport();
        info!(title = %reason.title, detail = %reason.detail, "disconnected");
        self.events.disconnected(&reason);
        self.last_disconnect = Some(reason);
    }

    fn close_transport(&mut self) {
        self.edits_subscribed = false;
        if let Some(mut transport) = self.transport.take() {
            transport.shutdown();
        }
        self.engine.send.clear();
        self.phase = Phase::Disconnected;
    }

    /// Return negotiation state and the opcode table to baseline without
    /// closing the socket.
    pub fn reset_protocol(&mut self) {
        debug!("resetting protocol state");
        if let Err(e) = self.engine.reset_protocol() {
            error!(opcode = e.opcode, capability = e.capability, "incomplete handler registration");
            metrics::inc_errors(ErrorKind::Protocol);
            self.disconnect(DisconnectReason::protocol(&e));
        }
    }

    pub(super) fn protocol_violation(&mut self, violation: &ProtocolViolation) {
        error!(
            opcode = violation.opcode(),
            position = violation.position(),
            highest = self.engine.table.highest(),
            error = %violation,
            "protocol violation"
        );
        self.events.warning(&format!("Protocol error: {violation}"));
        metrics::inc_errors(ErrorKind::Protocol);
        self.disconnect(DisconnectReason::protocol(violation));
    }

    /// Write pending outbound bytes. Failures drop the bytes; a hard failure
    /// is remembered and surfaces through the idle probe.
    pub(super) fn flush(&mut self) -> FlushOutcome {
        let Some(transport) = self.transport.as_mut() else {
            self.engine.send.clear();
            return FlushOutcome::Empty;
        };
        let outcome = self.engine.send.flush(transport);
        match &outcome {
            FlushOutcome::Empty => {}
            FlushOutcome::Sent { packets, .. } => {
                metrics::inc_packets(Direction::Outbound, u64::try_from(*packets).unwrap_or(u64::MAX));
            }
            FlushOutcome::Dropped { bytes, packets } => {
                debug!(bytes, packets, "socket not writable; dropped outbound packets");
                metrics::add_dropped_bytes(u64::try_from(*bytes).unwrap_or(u64::MAX));
            }
            FlushOutcome::Failed {
                bytes,
                packets,
                error,
            } => {
                debug!(bytes, packets, error = %error, "write failed; dropped outbound packets");
                metrics::add_dropped_bytes(u64::try_from(*bytes).unwrap_or(u64::MAX));
                self.write_failed = true;
            }
        }
        outcome
    }

    /// Send chat text, split into 64-character messages.
    ///
    /// Ignored while not connected.
    pub fn send_chat(&mut self, text: &str) {
        if text.is_empty() || self.phase != Phase::Active {
            return;
        }
        let features = self.features();
        let chars: Vec<char> = text.chars().collect();
        let mut pieces = chars.chunks(STRING_LENGTH).peekable();
        while let Some(piece) = pieces.next() {
            let piece: String = piece.iter().collect();
            let partial = pieces.peek().is_some();
            writer::chat(&mut self.engine.send, features, &piece, partial);
            self.flush();
        }
    }

    /// Send the local player's position.
    pub fn send_position(&mut self, position: PlayerPosition, held_block: u16) {
        if self.phase != Phase::Active {
            return;
        }
        let features = self.features();
        writer::position(&mut self.engine.send, features, position, held_block);
        self.flush();
    }

    /// Turn a local world edit into a packet.
    ///
    /// `block` is the new block at `coords`; zero means the block was broken,
    /// in which case the server expects the currently `selected` block.
    pub fn on_block_changed(&mut self, coords: [i16; 3], block: u16, selected: u16) {
        if !self.edits_subscribed || self.phase != Phase::Active {
            return;
        }
        let features = self.features();
        if block == 0 {
            writer::set_block(&mut self.engine.send, features, coords, false, selected);
        } else {
            writer::set_block(&mut self.engine.send, features, coords, true, block);
        }
        self.flush();
    }

    /// Report a mouse click. Only sent when `PlayerClick` was negotiated.
    pub fn send_player_click(&mut self, click: PlayerClick) {
        if self.phase != Phase::Active || !self.features().contains(FeatureSet::PLAYER_CLICK) {
            return;
        }
        writer::player_click(&mut self.engine.send, click);
        self.flush();
    }

    /// Request a texture pack. Zip urls are filed under
    /// [`download::TEXTURE_PACK`], anything else under [`download::TERRAIN`].
    pub fn download_texture_pack(
        &mut self,
        url: &str,
        last_modified: Option<SystemTime>,
        etag: Option<String>,
    ) {
        let key = if url.to_ascii_lowercase().ends_with(".zip") {
            download::TEXTURE_PACK
        } else {
            download::TERRAIN
        };
        debug!(key, url, "requesting texture pack");
        self.engine.downloads.request(DownloadRequest {
            key: key.to_owned(),
            url: url.to_owned(),
            last_modified,
            etag,
        });
    }
}
