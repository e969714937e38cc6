//! Metric helpers for `classicwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking connections in the `Active` phase.
pub const CONNECTIONS_ACTIVE: &str = "classicwire_connections_active";
/// Name of the counter tracking dispatched and flushed packets.
pub const PACKETS_PROCESSED: &str = "classicwire_packets_processed_total";
/// Name of the counter tracking error occurrences.
pub const ERRORS_TOTAL: &str = "classicwire_errors_total";
/// Name of the counter tracking outbound bytes dropped by failed flushes.
pub const SEND_BYTES_DROPPED: &str = "classicwire_send_bytes_dropped_total";

/// Direction of packet processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Packets dispatched from the server's byte stream.
    Inbound,
    /// Packets flushed to the server.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only read by metric labels"))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Category of a recorded error.
#[derive(Clone, Copy, Debug)]
pub enum ErrorKind {
    /// Connect timeout or socket error while connecting.
    Connect,
    /// Read failure or end of stream while active.
    Transport,
    /// Framing or dispatch violation.
    Protocol,
}

impl ErrorKind {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only read by metric labels"))]
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connect => "connect",
            ErrorKind::Transport => "transport",
            ErrorKind::Protocol => "protocol",
        }
    }
}

/// Increment the active connections gauge.
pub fn inc_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement the active connections gauge.
pub fn dec_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record `count` processed packets for the given direction.
pub fn inc_packets(direction: Direction, count: u64) {
    #[cfg(feature = "metrics")]
    counter!(PACKETS_PROCESSED, "direction" => direction.as_str()).increment(count);
    #[cfg(not(feature = "metrics"))]
    let _ = (direction, count);
}

/// Record an error occurrence.
pub fn inc_errors(kind: ErrorKind) {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL, "kind" => kind.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record outbound bytes discarded by a failed flush.
pub fn add_dropped_bytes(bytes: u64) {
    #[cfg(feature = "metrics")]
    counter!(SEND_BYTES_DROPPED).increment(bytes);
    #[cfg(not(feature = "metrics"))]
    let _ = bytes;
}
