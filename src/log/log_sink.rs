use crate::log::log_level::LogLevel;

/// Destination for log lines. Implemented by [`LoggerHandle`](super::logger_handle::LoggerHandle)
/// for the process logger and by [`NoopLogSink`](super::NoopLogSink) for tests.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}
