//! Notifications for the presentation layer.
//!
//! [`ClientEvents`] is the engine's only outward channel: connect progress,
//! the final disconnect reason and user-facing warnings. Every call is fire
//! and forget; implementations must not block.

use crate::error::DisconnectReason;

/// Receiver of connection lifecycle notifications.
///
/// Every method has a no-op default, so implementors override only what they
/// display.
///
/// # Examples
///
/// ```
/// use classicwire::{DisconnectReason, hooks::ClientEvents};
///
/// #[derive(Default)]
/// struct StatusLine {
///     text: String,
/// }
///
/// impl ClientEvents for StatusLine {
///     fn connect_progress(&mut self, remaining: f32) {
///         self.text = format!("{:.0}%", (1.0 - remaining) * 100.0);
///     }
///
///     fn disconnected(&mut self, reason: &DisconnectReason) { self.text = reason.to_string(); }
/// }
/// ```
pub trait ClientEvents {
    /// Fraction of the connect timeout still remaining, from `1.0` down to
    /// `0.0`.
    fn connect_progress(&mut self, _remaining: f32) {}

    /// The connection ended. Called exactly once per connection.
    fn disconnected(&mut self, _reason: &DisconnectReason) {}

    /// Something the user should see but that does not end the connection
    /// by itself.
    fn warning(&mut self, _message: &str) {}
}

impl ClientEvents for () {}

impl<E: ClientEvents + ?Sized> ClientEvents for &mut E {
    fn connect_progress(&mut self, remaining: f32) { (**self).connect_progress(remaining); }

    fn disconnected(&mut self, reason: &DisconnectReason) { (**self).disconnected(reason); }

    fn warning(&mut self, message: &str) { (**self).warning(message); }
}
