use std::{cell::RefCell, rc::Rc};

use classicwire::{ClientEvents, DisconnectReason};

/// Everything a [`RecordingEvents`] has seen.
#[derive(Clone, Debug, Default)]
pub struct Recorded {
    /// Connect progress values, in order.
    pub progress: Vec<f32>,
    /// Disconnect reasons, in order.
    pub disconnects: Vec<DisconnectReason>,
    /// Warnings, in order.
    pub warnings: Vec<String>,
}

/// Event receiver that records every call.
///
/// Clones share one log.
#[derive(Clone, Debug, Default)]
pub struct RecordingEvents {
    log: Rc<RefCell<Recorded>>,
}

impl RecordingEvents {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Snapshot of the recorded calls.
    #[must_use]
    pub fn recorded(&self) -> Recorded { self.log.borrow().clone() }

    /// Disconnect reasons reported so far.
    #[must_use]
    pub fn disconnects(&self) -> Vec<DisconnectReason> { self.log.borrow().disconnects.clone() }

    /// Warnings reported so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> { self.log.borrow().warnings.clone() }
}

impl ClientEvents for RecordingEvents {
    fn connect_progress(&mut self, remaining: f32) { self.log.borrow_mut().progress.push(remaining); }

    fn disconnected(&mut self, reason: &DisconnectReason) {
        self.log.borrow_mut().disconnects.push(reason.clone());
    }

    fn warning(&mut self, message: &str) { self.log.borrow_mut().warnings.push(message.to_owned()); }
}
