//! Test doubles for driving a [`Connection`](classicwire::Connection)
//! without a network.
//!
//! A [`ScriptedTransport`] replays inbound chunks and records outbound
//! bytes, a [`ManualClock`] advances only when told to, and
//! [`RecordingEvents`] captures every host notification. The [`packets`]
//! module builds server-sent packets byte for byte.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use classicwire::{ConnectionBuilder, Phase, TraceCodec};
//! use classicwire_testing::{ManualClock, ScriptedTransport, packets};
//!
//! let clock = ManualClock::new();
//! let transport = ScriptedTransport::connected();
//! transport.push_inbound(packets::handshake("Test", "Welcome", false));
//!
//! let mut connection = ConnectionBuilder::new(TraceCodec::new())
//!     .clock(clock.clone())
//!     .build_with_transport::<ScriptedTransport>();
//! connection.begin_connect_with("127.0.0.1:25565".parse().unwrap(), transport.clone());
//! connection.tick(Duration::from_millis(16));
//! connection.tick(Duration::from_millis(16));
//! assert_eq!(connection.phase(), Phase::Active);
//! assert_eq!(connection.state().server_name, "Test");
//! ```

mod clock;
mod downloads;
mod events;
pub mod logging;
pub mod packets;
mod transport;

pub use clock::ManualClock;
pub use downloads::FakeDownloader;
pub use events::{Recorded, RecordingEvents};
pub use logging::{LogCapture, LogLine, logs};
pub use transport::{InboundStep, ScriptedTransport, WriteMode};
