//! Captured log output for connection tests.
//!
//! `classicwire` logs through `tracing` with its `log` bridge enabled, so
//! every event also reaches the `log` facade where [`logtest`] records it.
//! The recorder is process-global; [`LogCapture`] serialises tests that read
//! it.

use std::sync::{Mutex, MutexGuard, OnceLock};

use log::Level;
use logtest::Logger;
use rstest::fixture;

/// One captured log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    /// Severity.
    pub level: Level,
    /// Rendered message including `key=value` fields.
    pub text: String,
}

/// Exclusive view of the process-wide log recorder.
pub struct LogCapture {
    recorder: MutexGuard<'static, Logger>,
    lines: Vec<LogLine>,
}

impl LogCapture {
    /// Take the recorder, discarding lines left by earlier tests.
    ///
    /// # Panics
    ///
    /// Panics if a previous test panicked while holding the recorder.
    #[must_use]
    pub fn new() -> Self {
        static RECORDER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let recorder = RECORDER.get_or_init(|| Mutex::new(Logger::start()));
        let mut recorder = recorder.lock().expect("log recorder poisoned");
        while recorder.pop().is_some() {}
        Self {
            recorder,
            lines: Vec::new(),
        }
    }

    /// Every line captured since the capture started, oldest first.
    pub fn lines(&mut self) -> &[LogLine] {
        while let Some(record) = self.recorder.pop() {
            self.lines.push(LogLine {
                level: record.level(),
                text: record.args().to_owned(),
            });
        }
        &self.lines
    }

    /// First line at `level` whose text contains every fragment.
    pub fn find(&mut self, level: Level, fragments: &[&str]) -> Option<LogLine> {
        self.lines()
            .iter()
            .find(|line| line.level == level && fragments.iter().all(|f| line.text.contains(f)))
            .cloned()
    }

    /// Like [`find`](Self::find) but fails the test with everything captured
    /// when no line matches.
    ///
    /// # Panics
    ///
    /// Panics if no captured line matches.
    pub fn expect_line(&mut self, level: Level, fragments: &[&str]) -> LogLine {
        if let Some(line) = self.find(level, fragments) {
            return line;
        }
        panic!(
            "no {level} line containing {fragments:?}; captured: {:#?}",
            self.lines
        );
    }
}

impl Default for LogCapture {
    fn default() -> Self { Self::new() }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logs() -> LogCapture { LogCapture::new() }
