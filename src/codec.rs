//! Packet handlers and the context they run in.
//!
//! A [`ProtocolCodec`] registers one handler per opcode it understands. The
//! engine registers the negotiation handlers itself (see [`handlers`]) and
//! lets the codec fill every other slot. Handlers receive a [`Session`]: the
//! mutable per-connection state the dispatch loop lends out for the duration
//! of one packet.

use std::time::Instant;

use tracing::warn;

use crate::{
    client::{ClientConfig, PlayerTunables, SessionState},
    dispatch::OpcodeTable,
    download::{DownloadOutcome, DownloadRequest, Downloader},
    error::DisconnectReason,
    extension::{CapabilityRegistry, Catalog, EntryOutcome, FeatureSet},
    frame::SendBuffer,
    hooks::ClientEvents,
};

pub mod cp437;
pub mod handlers;
pub mod reader;
mod trace;
pub mod writer;

pub use reader::PacketReader;
pub use trace::TraceCodec;

/// Game-level protocol plugged into the dispatch table.
///
/// Handlers are plain function pointers taking the session, so per-codec state
/// lives in `Self` and is reached through [`Session::codec`].
pub trait ProtocolCodec: Sized + 'static {
    /// Capabilities this codec can honour. Defaults to the standard set.
    fn catalog(&self) -> Catalog { Catalog::standard() }

    /// Register handlers and baseline sizes.
    ///
    /// Called on every handshake and protocol reset. The engine registers its
    /// own handlers afterwards, replacing the codec's for those opcodes. Every
    /// opcode the catalog can resize must end up registered.
    fn register(&self, table: &mut OpcodeTable<Self>);

    /// Drop per-session codec state.
    fn reset(&mut self) {}

    /// Periodic work run on each maintenance cycle.
    fn tick(_session: &mut Session<'_, Self>) {}

    /// A download filed through [`Session::request_download`] finished.
    fn on_resource(_session: &mut Session<'_, Self>, _key: &str, _outcome: DownloadOutcome) {}
}

/// Per-packet view of the connection handed to handlers.
pub struct Session<'a, C> {
    pub(crate) opcode: Option<u8>,
    pub(crate) now: Instant,
    pub(crate) codec: &'a mut C,
    pub(crate) table: &'a mut OpcodeTable<C>,
    pub(crate) registry: &'a mut CapabilityRegistry,
    pub(crate) catalog: &'a Catalog,
    pub(crate) config: &'a ClientConfig,
    pub(crate) state: &'a mut SessionState,
    pub(crate) outbound: &'a mut SendBuffer,
    pub(crate) events: &'a mut dyn ClientEvents,
    pub(crate) downloads: &'a mut dyn Downloader,
}

impl<C> Session<'_, C> {
    /// Opcode of the packet being handled; `None` during maintenance.
    #[must_use]
    pub fn opcode(&self) -> Option<u8> { self.opcode }

    /// Time the current tick started.
    #[must_use]
    pub fn now(&self) -> Instant { self.now }

    /// The codec's own state.
    pub fn codec(&mut self) -> &mut C { self.codec }

    /// Outbound packets; flushed by the engine at the end of the tick.
    pub fn outbound(&mut self) -> &mut SendBuffer { self.outbound }

    /// Features negotiated so far.
    #[must_use]
    pub fn features(&self) -> FeatureSet { self.registry.features() }

    /// Negotiation state.
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry { &*self.registry }

    /// Connection settings.
    #[must_use]
    pub fn config(&self) -> &ClientConfig { self.config }

    /// Session state.
    #[must_use]
    pub fn state(&self) -> &SessionState { &*self.state }

    /// Mutable session state.
    pub fn state_mut(&mut self) -> &mut SessionState { self.state }

    /// Player values the protocol may correct.
    pub fn tunables_mut(&mut self) -> &mut PlayerTunables { &mut self.state.tunables }

    /// Ask the engine to disconnect after this packet. The first request wins.
    pub fn request_disconnect(&mut self, reason: DisconnectReason) {
        if self.state.pending_disconnect.is_none() {
            self.state.pending_disconnect = Some(reason);
        }
    }

    /// Show a warning to the user.
    pub fn warn(&mut self, message: &str) {
        warn!(opcode = ?self.opcode, warning = message, "protocol warning");
        self.events.warning(message);
    }

    /// File a download; the outcome arrives through
    /// [`ProtocolCodec::on_resource`].
    pub fn request_download(&mut self, request: DownloadRequest) { self.downloads.request(request); }

    pub(crate) fn accept_capability(&mut self, name: &str, version: i32) -> EntryOutcome {
        let config = self.config;
        self.registry
            .accept_entry(self.catalog, name, version, self.table, |support| {
                config.supports(support)
            })
    }

    /// Send the client's extension list once the server's list is complete.
    pub(crate) fn reply_if_negotiated(&mut self) {
        if !self.registry.take_reply_due() {
            return;
        }
        let config = self.config;
        let extensions: Vec<_> = self
            .registry
            .client_extensions(self.catalog, |support| config.supports(support))
            .collect();
        let count = i16::try_from(extensions.len()).unwrap_or(i16::MAX);
        tracing::debug!(count, "sending client extension list");
        writer::ext_info(self.outbound, &config.app_name, count);
        for (name, version) in extensions {
            writer::ext_entry(self.outbound, name, version);
        }
    }
}
