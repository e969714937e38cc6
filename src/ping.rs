//! Round-trip bookkeeping for two-way pings.

use std::time::{Duration, Instant};

const CAPACITY: usize = 10;

#[derive(Clone, Copy, Debug)]
struct PingEntry {
    data: u16,
    sent: Instant,
    received: Option<Instant>,
}

/// The last ten client-initiated pings.
#[derive(Clone, Debug, Default)]
pub struct PingList {
    entries: Vec<PingEntry>,
    next: usize,
    sequence: u16,
}

impl PingList {
    /// Record a ping sent at `now` and return the payload to send with it.
    pub fn next_data(&mut self, now: Instant) -> u16 {
        self.sequence = self.sequence.wrapping_add(1);
        let entry = PingEntry {
            data: self.sequence,
            sent: now,
            received: None,
        };
        if self.entries.len() < CAPACITY {
            self.entries.push(entry);
        } else {
            self.entries[self.next] = entry;
        }
        self.next = (self.next + 1) % CAPACITY;
        self.sequence
    }

    /// Record the server's echo of `data`. Unknown or repeated echoes are
    /// ignored.
    pub fn update(&mut self, data: u16, now: Instant) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.data == data && entry.received.is_none())
        {
            Some(entry) => {
                entry.received = Some(now);
                true
            }
            None => false,
        }
    }

    /// Average one-way latency over answered pings.
    #[must_use]
    pub fn average(&self) -> Option<Duration> {
        let (total, count) = self
            .entries
            .iter()
            .filter_map(|entry| entry.received.map(|r| r.saturating_duration_since(entry.sent)))
            .fold((Duration::ZERO, 0u32), |(total, count), rtt| (total + rtt, count + 1));
        (count > 0).then(|| total / (count * 2))
    }

    /// Average one-way latency in whole milliseconds, or zero.
    #[must_use]
    pub fn average_ms(&self) -> u128 { self.average().map_or(0, |d| d.as_millis()) }

    /// Forget every ping.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next = 0;
        self.sequence = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_halves_round_trips() {
        let start = Instant::now();
        let mut pings = PingList::default();
        let a = pings.next_data(start);
        let b = pings.next_data(start);
        assert!(pings.update(a, start + Duration::from_millis(100)));
        assert!(pings.update(b, start + Duration::from_millis(300)));
        assert_eq!(pings.average_ms(), 100);
    }

    #[test]
    fn unanswered_and_unknown_pings_are_ignored() {
        let start = Instant::now();
        let mut pings = PingList::default();
        assert_eq!(pings.average(), None);
        let a = pings.next_data(start);
        assert!(!pings.update(a.wrapping_add(7), start));
        assert!(pings.update(a, start));
        assert!(!pings.update(a, start));
    }

    #[test]
    fn only_ten_pings_are_kept() {
        let start = Instant::now();
        let mut pings = PingList::default();
        let first = pings.next_data(start);
        for _ in 0..CAPACITY {
            pings.next_data(start);
        }
        assert!(!pings.update(first, start));
    }
}
