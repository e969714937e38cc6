//! Canonical error types for the crate.
//!
//! Internally the engine distinguishes connect failures, protocol violations,
//! malformed payloads and incomplete handler registration. None of these cross
//! the engine boundary: every failure is normalised into a single
//! [`DisconnectReason`] reported through
//! [`ClientEvents::disconnected`](crate::hooks::ClientEvents::disconnected).

use std::{fmt, io, net::SocketAddr, time::Duration};

use thiserror::Error;

/// Failure to establish the TCP connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The socket did not become writable before the connect deadline.
    #[error("connecting to {addr} timed out after {timeout:?}")]
    Timeout {
        /// Remote endpoint.
        addr: SocketAddr,
        /// Configured connect timeout.
        timeout: Duration,
    },
    /// The socket reported a hard error while connecting.
    #[error("error connecting to {addr}: {source}")]
    Socket {
        /// Remote endpoint.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
}

/// Errors raised by packet handlers while decoding a payload.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    /// A field read ran past the end of the payload.
    #[error("payload truncated: field needs {needed} bytes, {remaining} left")]
    Truncated {
        /// Bytes the field required.
        needed: usize,
        /// Bytes left in the payload.
        remaining: usize,
    },
    /// A field held a value the handler cannot accept.
    #[error("invalid field: {0}")]
    Invalid(&'static str),
}

/// Fatal framing or dispatch errors.
///
/// These indicate a capability or codec mismatch between client and server,
/// never a transient network condition. The stream has no length prefix to
/// skip by, so processing cannot continue past one.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// The opcode byte lies above every registered opcode.
    #[error("invalid opcode {opcode:#04x} at buffer position {position} (highest registered is {highest:#04x})")]
    InvalidOpcode {
        /// Offending opcode byte.
        opcode: u8,
        /// Read cursor at the opcode byte.
        position: usize,
        /// Highest opcode registered in the table.
        highest: u8,
    },
    /// The opcode is within range but nothing handles it.
    #[error("unsupported opcode {opcode:#04x} at buffer position {position}")]
    UnhandledOpcode {
        /// Offending opcode byte.
        opcode: u8,
        /// Read cursor at the opcode byte.
        position: usize,
    },
    /// The handler rejected the payload.
    #[error("malformed packet {opcode:#04x} at buffer position {position}: {source}")]
    Malformed {
        /// Opcode of the rejected packet.
        opcode: u8,
        /// Read cursor at the opcode byte.
        position: usize,
        /// Handler error.
        #[source]
        source: PacketError,
    },
}

impl ProtocolViolation {
    /// Opcode byte that triggered the violation.
    #[must_use]
    pub fn opcode(&self) -> u8 {
        match self {
            Self::InvalidOpcode { opcode, .. }
            | Self::UnhandledOpcode { opcode, .. }
            | Self::Malformed { opcode, .. } => *opcode,
        }
    }

    /// Buffer position of the offending opcode byte.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::InvalidOpcode { position, .. }
            | Self::UnhandledOpcode { position, .. }
            | Self::Malformed { position, .. } => *position,
        }
    }
}

/// An opcode reachable under the capability catalog has no handler.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("opcode {opcode:#04x} can be resized by capability {capability} but has no handler")]
pub struct RegistrationError {
    /// Opcode without a handler.
    pub opcode: u8,
    /// Capability whose effects reference the opcode.
    pub capability: &'static str,
}

/// Human-readable reason a connection ended.
///
/// This is the only failure surface exposed past the engine boundary: callers
/// observe either "still connected" or "disconnected with this reason".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisconnectReason {
    /// Short title suitable for a dialog heading.
    pub title: String,
    /// Longer explanation.
    pub detail: String,
}

impl DisconnectReason {
    /// Build a reason from a title and detail.
    #[must_use]
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }

    /// The connect attempt timed out or hit a socket error.
    #[must_use]
    pub fn connect_failed(addr: SocketAddr) -> Self {
        Self::new(
            format!("Failed to connect to {addr}"),
            "You failed to connect to the server. It's probably down!",
        )
    }

    /// Reading from the socket failed.
    #[must_use]
    pub fn read_failed() -> Self {
        Self::new("Lost connection to the server", "I/O error when reading packets")
    }

    /// The server closed its end of the stream.
    #[must_use]
    pub fn closed_by_server() -> Self {
        Self::new("Lost connection to the server", "Connection closed by the server")
    }

    /// The idle liveness probe failed.
    #[must_use]
    pub fn lost_connection() -> Self {
        Self::new("Disconnected!", "You've lost connection to the server")
    }

    /// A new connect attempt to `addr` closed the live session.
    #[must_use]
    pub fn replaced(addr: SocketAddr) -> Self {
        Self::new("Disconnected", format!("Connecting to {addr} instead"))
    }

    /// The server sent a kick packet.
    #[must_use]
    pub fn kicked(reason: impl Into<String>) -> Self { Self::new("Kicked by the server", reason) }

    /// A framing or dispatch error made the stream unusable.
    #[must_use]
    pub fn protocol(error: &dyn std::error::Error) -> Self {
        Self::new("Protocol error", error.to_string())
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::invalid(
        ProtocolViolation::InvalidOpcode { opcode: 0x7f, position: 12, highest: 0x2c },
        "invalid opcode 0x7f at buffer position 12 (highest registered is 0x2c)"
    )]
    #[case::unhandled(
        ProtocolViolation::UnhandledOpcode { opcode: 0x05, position: 0 },
        "unsupported opcode 0x05 at buffer position 0"
    )]
    fn violation_messages_carry_diagnostic_context(
        #[case] violation: ProtocolViolation,
        #[case] expected: &str,
    ) {
        assert_eq!(violation.to_string(), expected);
    }

    #[test]
    fn protocol_reason_embeds_violation_text() {
        let violation = ProtocolViolation::Malformed {
            opcode: 0x11,
            position: 3,
            source: PacketError::Invalid("negative version"),
        };
        let reason = DisconnectReason::protocol(&violation);
        assert_eq!(reason.title, "Protocol error");
        assert!(reason.detail.contains("0x11"));
        assert_eq!(violation.opcode(), 0x11);
        assert_eq!(violation.position(), 3);
    }

    #[test]
    fn reason_display_joins_title_and_detail() {
        let reason = DisconnectReason::kicked("Banned");
        assert_eq!(reason.to_string(), "Kicked by the server: Banned");
    }
}
