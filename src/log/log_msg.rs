use crate::log::log_level::LogLevel;

/// A single log event queued for the logger worker.
#[derive(Debug, Clone)]
pub struct LogMsg {
    /// Severity of the event.
    pub level: LogLevel,
    /// Milliseconds since the UNIX epoch.
    pub ts_ms: u128,
    /// The message content.
    pub text: String,
    /// The target source of the log, typically the static module path.
    pub target: &'static str,
}

impl LogMsg {
    /// Creates a new `LogMsg` instance.
    ///
    /// ```rust,ignore
    /// let msg = LogMsg::new(LogLevel::Info, "client registered", module_path!(), now_millis());
    /// ```
    pub fn new(
        level: LogLevel,
        text: impl Into<String>,
        target: &'static str,
        ts_ms: u128,
    ) -> Self {
        Self {
            level,
            ts_ms,
            text: text.into(),
            target,
        }
    }

    /// Renders the line exactly as the logger writes it to disk.
    pub fn render(&self) -> String {
        format!(
            "[{:?}] {} | {} | {}",
            self.level, self.ts_ms, self.target, self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_level_target_and_text() {
        let msg = LogMsg::new(LogLevel::Warn, "name taken", "client_registry::registration", 42);
        assert_eq!(
            msg.render(),
            "[Warn] 42 | client_registry::registration | name taken"
        );
    }
}
