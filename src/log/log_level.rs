/// Defines the severity levels for log messages.
///
/// Variants are ordered from least to most severe, so `level >= LogLevel::Warn`
/// selects warnings and errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Designates very fine-grained informational events.
    Trace,
    /// Designates fine-grained informational events that are most useful to debug an application.
    Debug,
    /// Designates informational messages that highlight coarse-grained progress.
    Info,
    /// Designates potentially harmful situations.
    Warn,
    /// Designates error events that might still allow the application to continue running.
    Error,
}

impl LogLevel {
    /// Parses a level name as found in config files (`"warn"`, `"Error"`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}
