//! Builder for configuring a [`Connection`].

use std::time::Duration;

use super::{ClientConfig, Connection, SessionState, SocketOptions, connection::Engine};
use crate::{
    clock::{Clock, SystemClock},
    codec::ProtocolCodec,
    dispatch::OpcodeTable,
    download::{Downloader, NoDownloads},
    extension::CapabilityRegistry,
    frame::{ReceiveBuffer, SendBuffer},
    hooks::ClientEvents,
    transport::{TcpTransport, Transport},
};

/// Builder for [`Connection`].
///
/// The builder is generic over the codec `C` and the event receiver `E`
/// (default: `()`, which ignores every event).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use classicwire::{ConnectionBuilder, Phase, TraceCodec};
///
/// let connection = ConnectionBuilder::new(TraceCodec::new())
///     .username("alice")
///     .mppass("0123456789abcdef")
///     .connect_timeout(Duration::from_secs(5))
///     .build();
/// assert_eq!(connection.phase(), Phase::Disconnected);
/// ```
pub struct ConnectionBuilder<C, E = ()> {
    codec: C,
    events: E,
    config: ClientConfig,
    clock: Box<dyn Clock>,
    downloads: Box<dyn Downloader>,
}

impl<C: ProtocolCodec> ConnectionBuilder<C, ()> {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            events: (),
            config: ClientConfig::default(),
            clock: Box::new(SystemClock),
            downloads: Box::new(NoDownloads),
        }
    }
}

impl<C: ProtocolCodec, E: ClientEvents> ConnectionBuilder<C, E> {
    /// Replace the event receiver.
    #[must_use]
    pub fn events<E2: ClientEvents>(self, events: E2) -> ConnectionBuilder<C, E2> {
        ConnectionBuilder {
            codec: self.codec,
            events,
            config: self.config,
            clock: self.clock,
            downloads: self.downloads,
        }
    }

    /// Replace every setting at once.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Player name sent at login.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Verification key sent at login.
    #[must_use]
    pub fn mppass(mut self, mppass: impl Into<String>) -> Self {
        self.config.mppass = mppass.into();
        self
    }

    /// Application name sent in the client's extension list.
    #[must_use]
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.config.app_name = app_name.into();
        self
    }

    /// Advertise extension support at login.
    #[must_use]
    pub fn extensions(mut self, enabled: bool) -> Self {
        self.config.extensions = enabled;
        self
    }

    /// Declare support for more than 256 block types.
    #[must_use]
    pub fn extended_blocks(mut self, enabled: bool) -> Self {
        self.config.extended_blocks = enabled;
        self
    }

    /// Deadline for the TCP connect.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Silence after which the socket is probed.
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Interval between liveness probes once idle.
    #[must_use]
    pub fn probe_interval(mut self, interval: Duration) -> Self {
        self.config.probe_interval = interval;
        self
    }

    /// Run maintenance on every `ratio`th tick. Zero is treated as one.
    #[must_use]
    pub fn maintenance_ratio(mut self, ratio: u32) -> Self {
        self.config.maintenance_ratio = ratio;
        self
    }

    /// Send a two-way ping every `cycles` maintenance cycles. Zero disables
    /// pings.
    #[must_use]
    pub fn ping_interval(mut self, cycles: u32) -> Self {
        self.config.ping_interval = cycles;
        self
    }

    /// Size of each socket read.
    #[must_use]
    pub fn read_chunk(mut self, bytes: usize) -> Self {
        self.config.read_chunk = bytes;
        self
    }

    /// Socket options applied before connecting.
    #[must_use]
    pub fn socket_options(mut self, options: SocketOptions) -> Self {
        self.config.socket = options;
        self
    }

    /// Time source for deadlines and receive timestamps.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Fetcher for texture packs and other resources.
    #[must_use]
    pub fn downloader(mut self, downloader: impl Downloader + 'static) -> Self {
        self.downloads = Box::new(downloader);
        self
    }

    /// Build a disconnected TCP connection.
    #[must_use]
    pub fn build(self) -> Connection<C, E, TcpTransport> { self.build_with_transport() }

    /// Build a disconnected connection over a custom transport type, started
    /// with [`Connection::begin_connect_with`].
    #[must_use]
    pub fn build_with_transport<T: Transport>(self) -> Connection<C, E, T> {
        let catalog = self.codec.catalog();
        let registry = CapabilityRegistry::new(&catalog);
        let now = self.clock.now();
        let recv = ReceiveBuffer::with_capacity(self.config.receive_capacity, self.config.read_chunk);
        let send = SendBuffer::with_capacity(self.config.send_capacity);
        Connection {
            engine: Engine {
                codec: self.codec,
                table: OpcodeTable::new(),
                registry,
                catalog,
                config: self.config,
                state: SessionState::default(),
                send,
                downloads: self.downloads,
            },
            recv,
            events: self.events,
            transport: None,
            clock: self.clock,
            phase: super::Phase::Disconnected,
            remote: None,
            connect_deadline: now,
            last_packet: now,
            idle_accumulator: Duration::ZERO,
            net_ticks: 0,
            maintenance_cycles: 0,
            write_failed: false,
            edits_subscribed: false,
            last_disconnect: None,
        }
    }
}
