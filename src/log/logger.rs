use crate::{
    clock,
    config::Config,
    log::{log_level::LogLevel, log_msg::LogMsg, logger_handle::LoggerHandle},
};

use std::{
    fs::{self, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc::{self, TrySendError},
    thread,
};

// -----------------------------------------------------------------------------
// COMPILE-TIME CONFIGURATION
// -----------------------------------------------------------------------------

/// Flush to disk every 20 lines if debugging/tracing (to see crashes near real-time).
#[cfg(feature = "log-debug")]
const FLUSH_BATCH_SIZE: u32 = 20;

/// Flush to disk every 200 lines otherwise. The worker also flushes whenever
/// the queue drains, so a quiet server never sits on unwritten lines.
#[cfg(not(feature = "log-debug"))]
const FLUSH_BATCH_SIZE: u32 = 200;

// -----------------------------------------------------------------------------

/// Bounded, non-blocking logger that writes to a per-process log file.
///
/// A background worker consumes messages from a bounded channel and appends
/// them to a file. Messages at or above `mirror_level` are also echoed to
/// stderr so an operator running the binary in a terminal sees problems
/// without tailing the file.
pub struct Logger {
    handle: LoggerHandle,
    _thread: Option<thread::JoinHandle<()>>,
    file_path: PathBuf,
}

impl Logger {
    /// Starts the logger for the registry client, reading `[Logging]` keys
    /// `client_log_path`, `client_log_filename` and `stderr_level`.
    #[must_use]
    pub fn start_client(cap: usize, config: &Config) -> Self {
        Self::start("client_log_filename", "client_log_path", cap, config)
    }

    /// Starts the logger for the registry server, reading `[Logging]` keys
    /// `server_log_path`, `server_log_filename` and `stderr_level`.
    #[must_use]
    pub fn start_server(cap: usize, config: &Config) -> Self {
        Self::start("server_log_filename", "server_log_path", cap, config)
    }

    fn start(fn_key: &str, path_key: &str, cap: usize, config: &Config) -> Self {
        let app_name = config.get_non_empty("Logging", fn_key);
        let mirror_level = config
            .get_non_empty("Logging", "stderr_level")
            .and_then(LogLevel::parse)
            .or(Some(LogLevel::Warn));

        let dir = match config.get_non_empty("Logging", path_key) {
            Some(dir_str) => expand_path(dir_str),
            None => exe_dir_fallback_cwd().join("logs"),
        };
        Self::start_in_dir(dir, app_name, cap, mirror_level)
    }

    /// Starts the logger in a specific directory.
    ///
    /// Creates `dir` if missing, names the file after the start time and PID,
    /// and spawns the worker thread.
    ///
    /// # Arguments
    ///
    /// * `dir` - The directory where the log file will be created.
    /// * `app_name` - Optional prefix for the log filename.
    /// * `cap` - Capacity of the log channel (backpressure buffer).
    /// * `mirror_level` - Minimum level echoed to stderr; `None` disables the echo.
    pub fn start_in_dir<D: AsRef<Path>>(
        dir: D,
        app_name: Option<&str>,
        cap: usize,
        mirror_level: Option<LogLevel>,
    ) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let _ = fs::create_dir_all(&dir);

        let ts = clock::timestamp_for_filename();
        let pid = std::process::id();

        let fname = if let Some(name) = app_name {
            format!("{}-{}-pid{}.log", name, ts, pid)
        } else {
            format!("{}-pid{}.log", ts, pid)
        };

        let file_path = dir.join(&fname);

        let (tx, rx) = mpsc::sync_channel::<LogMsg>(cap.max(1));
        let handle = LoggerHandle { tx };

        let file_path_clone = file_path.clone();

        let _thread = thread::Builder::new()
            .name("logger-worker".into())
            .spawn(move || {
                // Try target file -> temp file -> sink (never panic).
                let writer: Box<dyn Write + Send> = if let Ok(f) = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&file_path_clone)
                {
                    Box::new(f)
                } else {
                    let fallback = std::env::temp_dir().join("client-registry-fallback.log");
                    match OpenOptions::new().create(true).append(true).open(&fallback) {
                        Ok(f) => Box::new(f),
                        Err(_) => Box::new(io::sink()),
                    }
                };

                let mut out: BufWriter<Box<dyn Write + Send>> = BufWriter::new(writer);
                let mut lines_written: u32 = 0;

                let mut write_line = |out: &mut BufWriter<Box<dyn Write + Send>>, m: LogMsg| {
                    let line = m.render();
                    let _ = writeln!(out, "{line}");
                    if mirror_level.is_some_and(|min| m.level >= min) {
                        eprintln!("{line}");
                    }
                    lines_written = lines_written.wrapping_add(1);
                    if lines_written % FLUSH_BATCH_SIZE == 0 {
                        let _ = out.flush();
                    }
                };

                while let Ok(m) = rx.recv() {
                    write_line(&mut out, m);
                    // Drain whatever is already queued, then flush once.
                    while let Ok(m) = rx.try_recv() {
                        write_line(&mut out, m);
                    }
                    let _ = out.flush();
                }

                let _ = out.flush();
            })
            .ok();

        Self {
            handle,
            _thread,
            file_path,
        }
    }

    /// Attempts to enqueue a log message without blocking the current thread.
    ///
    /// If the channel is full the message is **dropped** and an error is returned.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), TrySendError<LogMsg>> {
        self.handle.try_log(level, text, target)
    }

    /// Returns a cloneable handle to the logger sink.
    #[must_use]
    pub fn handle(&self) -> LoggerHandle {
        self.handle.clone()
    }

    /// Returns the path of the active log file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Closes this logger's sender and waits for the worker to write what is
    /// queued. Blocks until every cloned handle has been dropped as well.
    pub fn shutdown(self) {
        let Self {
            handle,
            _thread: worker,
            ..
        } = self;
        drop(handle);
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

/// Directory of the running executable (target/{debug,release}),
/// or the current working directory on error.
pub(crate) fn exe_dir_fallback_cwd() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Expands tilde (`~`) in file paths to the user's home directory.
pub(crate) fn expand_path(path_str: &str) -> PathBuf {
    if path_str.starts_with('~') {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(PathBuf::from);

        if let Some(mut home_path) = home {
            if path_str == "~" {
                return home_path;
            }
            if path_str.starts_with("~/") || path_str.starts_with("~\\") {
                home_path.push(&path_str[2..]);
                return home_path;
            }
        }
    }
    PathBuf::from(path_str)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use rand::RngCore;
    use std::time::{Duration, Instant};

    fn unique_temp_dir() -> PathBuf {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        let suffix = u64::from_le_bytes(bytes);
        std::env::temp_dir().join(format!("registry_logger_test_{suffix}"))
    }

    #[test]
    fn logger_writes_lines_to_file() {
        let dir = unique_temp_dir();
        let logger = Logger::start_in_dir(&dir, Some("unit"), 16, None);

        logger
            .try_log(LogLevel::Warn, "storage is slow", "test::logger")
            .expect("queue has room");

        let path = logger.file_path().to_path_buf();
        assert!(path.starts_with(&dir));

        // The worker flushes once its queue drains; poll for the line.
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut contents = String::new();
        while Instant::now() < deadline {
            contents = fs::read_to_string(&path).unwrap_or_default();
            if contents.contains("storage is slow") {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(
            contents.contains("[Warn]") && contents.contains("storage is slow"),
            "log file did not contain the line: {contents:?}"
        );

        drop(logger);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn shutdown_waits_for_queued_lines() {
        let dir = unique_temp_dir();
        let logger = Logger::start_in_dir(&dir, None, 64, None);
        for n in 0..10 {
            logger
                .try_log(LogLevel::Info, format!("line {n}"), "test::logger")
                .expect("queue has room");
        }
        let path = logger.file_path().to_path_buf();
        logger.shutdown();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 10);
        assert!(contents.contains("line 9"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn expand_path_leaves_plain_paths_alone() {
        assert_eq!(expand_path("logs/server"), PathBuf::from("logs/server"));
    }
}
