//! Connection settings and socket options.

use std::{io, time::Duration};

use socket2::{Socket, TcpKeepalive};

use crate::extension::ClientSupport;

/// Identity, negotiation and timing settings for one connection.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use classicwire::client::ClientConfig;
///
/// let config = ClientConfig::default();
/// assert_eq!(config.connect_timeout, Duration::from_secs(15));
/// assert_eq!(config.maintenance_ratio, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Player name sent in the login packet.
    pub username: String,
    /// Verification key sent in the login packet.
    pub mppass: String,
    /// Application name sent in the client's `ExtInfo`.
    pub app_name: String,
    /// Advertise extension support in the login packet.
    pub extensions: bool,
    /// The client supports more than 256 block types.
    pub extended_blocks: bool,
    /// Deadline for the TCP connect.
    pub connect_timeout: Duration,
    /// Silence after which the socket is probed for liveness.
    pub idle_timeout: Duration,
    /// Interval between liveness probes once idle.
    pub probe_interval: Duration,
    /// Maintenance runs on every Nth tick.
    pub maintenance_ratio: u32,
    /// Two-way pings are sent every Nth maintenance cycle.
    pub ping_interval: u32,
    /// Size of each socket read.
    pub read_chunk: usize,
    /// Initial capacity of the receive buffer.
    pub receive_capacity: usize,
    /// Initial capacity of the send buffer.
    pub send_capacity: usize,
    /// Options applied to the TCP socket before connecting.
    pub socket: SocketOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            username: "Singleplayer".to_owned(),
            mppass: String::new(),
            app_name: concat!("classicwire ", env!("CARGO_PKG_VERSION")).to_owned(),
            extensions: true,
            extended_blocks: true,
            connect_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(30),
            probe_interval: Duration::from_secs(1),
            maintenance_ratio: 3,
            ping_interval: 20,
            read_chunk: 16 * 1024,
            receive_capacity: 20 * 1024,
            send_capacity: 4 * 1024,
            socket: SocketOptions::default(),
        }
    }
}

impl ClientConfig {
    /// Whether the client has the given support.
    #[must_use]
    pub fn supports(&self, support: ClientSupport) -> bool {
        match support {
            ClientSupport::ExtendedBlocks => self.extended_blocks,
        }
    }
}

/// Socket options applied before connecting.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use classicwire::client::SocketOptions;
///
/// let options = SocketOptions::default()
///     .nodelay(true)
///     .keepalive(Some(Duration::from_secs(30)));
/// let expected = SocketOptions::default()
///     .nodelay(true)
///     .keepalive(Some(Duration::from_secs(30)));
/// assert_eq!(options, expected);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SocketOptions {
    nodelay: Option<bool>,
    keepalive: Option<Toggle>,
    linger: Option<Toggle>,
    send_buffer_size: Option<usize>,
    recv_buffer_size: Option<usize>,
    reuseaddr: Option<bool>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Toggle {
    Disabled,
    Duration(Duration),
}

impl Toggle {
    fn from_option(value: Option<Duration>) -> Self { value.map_or(Self::Disabled, Self::Duration) }

    const fn to_option(self) -> Option<Duration> {
        match self {
            Self::Disabled => None,
            Self::Duration(value) => Some(value),
        }
    }
}

impl SocketOptions {
    /// Configure `TCP_NODELAY`. Packets are small and latency bound, so
    /// callers usually enable this.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = Some(enabled);
        self
    }

    /// Configure `SO_KEEPALIVE`; `None` disables it.
    #[must_use]
    pub fn keepalive(mut self, duration: Option<Duration>) -> Self {
        self.keepalive = Some(Toggle::from_option(duration));
        self
    }

    /// Configure `SO_LINGER`; `None` disables it.
    #[must_use]
    pub fn linger(mut self, duration: Option<Duration>) -> Self {
        self.linger = Some(Toggle::from_option(duration));
        self
    }

    /// Configure the socket send buffer size.
    #[must_use]
    pub fn send_buffer_size(mut self, size: usize) -> Self {
        self.send_buffer_size = Some(size);
        self
    }

    /// Configure the socket receive buffer size.
    #[must_use]
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }

    /// Configure `SO_REUSEADDR`.
    #[must_use]
    pub fn reuseaddr(mut self, enabled: bool) -> Self {
        self.reuseaddr = Some(enabled);
        self
    }

    pub(crate) fn apply(&self, socket: &Socket) -> io::Result<()> {
        if let Some(enabled) = self.nodelay {
            socket.set_nodelay(enabled)?;
        }
        if let Some(keepalive) = self.keepalive {
            match keepalive.to_option() {
                Some(duration) => {
                    socket.set_keepalive(true)?;
                    socket.set_tcp_keepalive(&TcpKeepalive::new().with_time(duration))?;
                }
                None => socket.set_keepalive(false)?,
            }
        }
        if let Some(linger) = self.linger {
            socket.set_linger(linger.to_option())?;
        }
        if let Some(size) = self.send_buffer_size {
            socket.set_send_buffer_size(size)?;
        }
        if let Some(size) = self.recv_buffer_size {
            socket.set_recv_buffer_size(size)?;
        }
        if let Some(enabled) = self.reuseaddr {
            socket.set_reuse_address(enabled)?;
        }
        Ok(())
    }
}
