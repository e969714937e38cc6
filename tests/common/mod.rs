//! Shared harness for connection integration tests.
#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::{net::SocketAddr, time::Duration};

use classicwire::{Connection, ConnectionBuilder, Phase, ProtocolCodec};
use classicwire_testing::{ManualClock, RecordingEvents, ScriptedTransport};

/// Interval passed to every scheduler tick.
pub const TICK: Duration = Duration::from_millis(16);

/// Address used for scripted connects.
pub fn addr() -> SocketAddr { "127.0.0.1:25565".parse().expect("test address") }

/// A connection wired to scripted collaborators.
pub struct Harness<C: ProtocolCodec> {
    pub connection: Connection<C, RecordingEvents, ScriptedTransport>,
    pub transport: ScriptedTransport,
    pub clock: ManualClock,
    pub events: RecordingEvents,
}

impl<C: ProtocolCodec> Harness<C> {
    /// Build from `builder` and start connecting over `transport`.
    pub fn start(builder: ConnectionBuilder<C>, transport: ScriptedTransport) -> Self {
        let clock = ManualClock::new();
        let events = RecordingEvents::new();
        let mut connection = builder
            .events(events.clone())
            .clock(clock.clone())
            .build_with_transport::<ScriptedTransport>();
        connection.begin_connect_with(addr(), transport.clone());
        Self {
            connection,
            transport,
            clock,
            events,
        }
    }

    /// Build from `builder`, finish connecting and discard the login bytes.
    pub fn active(builder: ConnectionBuilder<C>) -> Self {
        let mut harness = Self::start(builder, ScriptedTransport::connected());
        harness.connection.tick(TICK);
        assert_eq!(harness.connection.phase(), Phase::Active);
        let _login = harness.transport.take_written();
        harness
    }

    /// Deliver `bytes` and run one tick.
    pub fn feed(&mut self, bytes: impl Into<Vec<u8>>) {
        self.transport.push_inbound(bytes);
        self.connection.tick(TICK);
    }

    /// Title of the single reported disconnect.
    pub fn disconnect_title(&self) -> String {
        let disconnects = self.events.disconnects();
        assert_eq!(disconnects.len(), 1, "expected exactly one disconnect");
        disconnects[0].title.clone()
    }
}
