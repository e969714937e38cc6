use std::{
    cell::Cell,
    rc::Rc,
    time::{Duration, Instant},
};

use classicwire::clock::Clock;

/// Clock that only moves when [`advance`](Self::advance) is called.
///
/// Clones share the same instant, so a test keeps one handle while the
/// connection owns another.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self { Self::new() }
}

impl ManualClock {
    /// Start at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) { self.now.set(self.now.get() + by); }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant { self.now.get() }
}
