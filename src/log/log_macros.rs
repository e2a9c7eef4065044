//! Leveled logging macros for any [`LogSink`](crate::log::log_sink::LogSink)
//! and for the [`Logger`](crate::log::logger::Logger) itself.
//!
//! # Feature Flags
//! Log levels are controlled by cargo features:
//! `log-trace`, `log-debug`, `log-info`, `log-warn`, `log-error`.
//!
//! If a feature is disabled, the corresponding macros expand to `()`, removing
//! all formatting and allocation overhead at compile time.

// ============================================================================
// 1. GENERIC INTERNAL MACROS
// ============================================================================

#[macro_export]
macro_rules! sink_log {
    ($sink:expr, $lvl:expr, $($arg:tt)*) => {{
        let __msg = format!($($arg)*);
        $sink.log($lvl, &__msg, module_path!());
    }};
}

#[macro_export]
macro_rules! logger_log {
    ($logger:expr, $lvl:expr, $($arg:tt)*) => {{
        let _ = $logger.try_log($lvl, format!($($arg)*), module_path!());
    }};
}

// ============================================================================
// 2. LEVEL-SPECIFIC MACROS (Feature Gated)
// ============================================================================

// ---------------------- TRACE ----------------------
#[cfg(feature = "log-trace")]
#[macro_export]
macro_rules! sink_trace   { ($sink:expr, $($arg:tt)*)   => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Trace, $($arg)*) } }
#[cfg(feature = "log-trace")]
#[macro_export]
macro_rules! logger_trace { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Trace, $($arg)*) } }

#[cfg(not(feature = "log-trace"))]
#[macro_export]
macro_rules! sink_trace {
    ($($arg:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "log-trace"))]
#[macro_export]
macro_rules! logger_trace {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- DEBUG ----------------------
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! sink_debug   { ($sink:expr, $($arg:tt)*)   => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Debug, $($arg)*) } }
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! logger_debug { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Debug, $($arg)*) } }

#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! sink_debug {
    ($($arg:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! logger_debug {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- INFO ----------------------
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! sink_info   { ($sink:expr, $($arg:tt)*)   => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Info, $($arg)*) } }
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! logger_info { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Info, $($arg)*) } }

#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! sink_info {
    ($($arg:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! logger_info {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- WARN ----------------------
#[cfg(feature = "log-warn")]
#[macro_export]
macro_rules! sink_warn   { ($sink:expr, $($arg:tt)*)   => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Warn, $($arg)*) } }
#[cfg(feature = "log-warn")]
#[macro_export]
macro_rules! logger_warn { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Warn, $($arg)*) } }

#[cfg(not(feature = "log-warn"))]
#[macro_export]
macro_rules! sink_warn {
    ($($arg:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "log-warn"))]
#[macro_export]
macro_rules! logger_warn {
    ($($arg:tt)*) => {
        ()
    };
}

// ---------------------- ERROR ----------------------
#[cfg(feature = "log-error")]
#[macro_export]
macro_rules! sink_error   { ($sink:expr, $($arg:tt)*)   => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Error, $($arg)*) } }
#[cfg(feature = "log-error")]
#[macro_export]
macro_rules! logger_error { ($logger:expr, $($arg:tt)*) => { $crate::logger_log!($logger, $crate::log::log_level::LogLevel::Error, $($arg)*) } }

#[cfg(not(feature = "log-error"))]
#[macro_export]
macro_rules! sink_error {
    ($($arg:tt)*) => {
        ()
    };
}
#[cfg(not(feature = "log-error"))]
#[macro_export]
macro_rules! logger_error {
    ($($arg:tt)*) => {
        ()
    };
}
