use std::sync::Mutex;

use crate::log::{log_level::LogLevel, log_sink::LogSink};

/// Discards every line. Default sink for stores and servers built without a logger.
#[derive(Debug, Clone, Default)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    #[inline]
    fn log(&self, _level: LogLevel, _msg: &str, _target: &'static str) {}
}

/// Keeps every line in memory so tests can assert on what was logged.
#[derive(Debug, Default)]
pub struct CaptureLogSink {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl CaptureLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines, oldest first.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// True if any line at `level` contains `needle`.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, text)| *l == level && text.contains(needle))
    }
}

impl LogSink for CaptureLogSink {
    fn log(&self, level: LogLevel, msg: &str, _target: &'static str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, msg.to_owned()));
        }
    }
}
