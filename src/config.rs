use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::log::log_sink::LogSink;
use crate::protocol::{MAX_PAYLOAD_LEN, SERVER_VERSION};
use crate::sink_warn;

/// Port used when neither the config nor the port file yields a valid one.
pub const DEFAULT_PORT: u16 = 1234;
/// Loopback by default: the registry is not meant to face the network.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// File holding just the listen port, e.g. `1357\n`.
pub const DEFAULT_PORT_FILE: &str = "port.info";
/// Directory holding the identity tables.
pub const DEFAULT_STORE_PATH: &str = "server.db";
/// Name the client registers when none is given.
pub const DEFAULT_CLIENT_NAME: &str = "guest";
/// Environment variable overriding the store location.
pub const STORE_PATH_ENV: &str = "REGISTRY_STORE_PATH";

/// INI-style configuration: optional global keys followed by `[Section]`
/// blocks of `key = value` lines. `#` starts a comment line.
#[derive(Debug)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Error reading file {}: {e}", path.display()))?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut globals = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = &line[1..line.len() - 1];
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some(pos) = line.find('=') {
                let key = line[..pos].trim().to_string();
                let value = line[pos + 1..].trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        globals.insert(key, value);
                    }
                    Some(sec) => {
                        sections.entry(sec.clone()).or_default().insert(key, value);
                    }
                }
            }
        }
        Config { globals, sections }
    }

    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }
}

/// Everything the registry server needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub store_path: PathBuf,
    /// Largest payload a request may declare; larger ones close the connection.
    pub max_payload_len: usize,
    /// Per-read socket timeout. `None` blocks forever.
    pub read_timeout: Option<Duration>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            max_payload_len: MAX_PAYLOAD_LEN,
            read_timeout: None,
        }
    }
}

impl ServerSettings {
    /// Resolves settings from the `[Server]` and `[Store]` sections.
    ///
    /// Invalid values are logged and replaced by their defaults; this never fails.
    pub fn from_config(config: &Config, log: &dyn LogSink) -> Self {
        let host = config
            .get_non_empty_or_default("Server", "host", DEFAULT_HOST)
            .to_owned();
        let port = resolve_port(config, "Server", log);

        let store_path = std::env::var(STORE_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| {
                config
                    .get_non_empty_or_default("Store", "path", DEFAULT_STORE_PATH)
                    .to_owned()
            });

        let max_payload_len = match config.get_non_empty("Server", "max_payload_len") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    sink_warn!(
                        log,
                        "invalid max_payload_len {:?}; using {}",
                        raw,
                        MAX_PAYLOAD_LEN
                    );
                    MAX_PAYLOAD_LEN
                }
            },
            None => MAX_PAYLOAD_LEN,
        };

        let read_timeout = match config.get_non_empty("Server", "read_timeout_secs") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    sink_warn!(log, "invalid read_timeout_secs {:?}; reads will block", raw);
                    None
                }
            },
            None => None,
        };

        Self {
            host,
            port,
            store_path: PathBuf::from(store_path),
            max_payload_len,
            read_timeout,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where the registry client connects and what it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub version: u8,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            name: DEFAULT_CLIENT_NAME.to_owned(),
            version: SERVER_VERSION,
        }
    }
}

impl ClientSettings {
    /// Resolves settings from the `[Client]` section, sharing the port lookup
    /// rules with the server.
    pub fn from_config(config: &Config, log: &dyn LogSink) -> Self {
        let host = config
            .get_non_empty_or_default("Client", "host", DEFAULT_HOST)
            .to_owned();
        let port = resolve_port(config, "Client", log);
        let name = config
            .get_non_empty_or_default("Client", "name", DEFAULT_CLIENT_NAME)
            .to_owned();
        let version = match config.get_non_empty("Client", "version") {
            Some(raw) => raw.parse::<u8>().unwrap_or_else(|_| {
                sink_warn!(log, "invalid client version {:?}; using {}", raw, SERVER_VERSION);
                SERVER_VERSION
            }),
            None => SERVER_VERSION,
        };

        Self {
            host,
            port,
            name,
            version,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Port lookup: `[section] port`, then the port file named by
/// `[section] port_file` (default `port.info`), then [`DEFAULT_PORT`].
pub fn resolve_port(config: &Config, section: &str, log: &dyn LogSink) -> u16 {
    if let Some(raw) = config.get_non_empty(section, "port") {
        match parse_port(raw) {
            Ok(port) => return port,
            Err(e) => sink_warn!(log, "[{}] port: {}", section, e),
        }
    }

    let port_file = config.get_non_empty_or_default(section, "port_file", DEFAULT_PORT_FILE);
    match read_port_file(port_file) {
        Ok(port) => port,
        Err(e) => {
            sink_warn!(log, "warning! {}. using {}", e, DEFAULT_PORT);
            DEFAULT_PORT
        }
    }
}

/// Reads a port number from a file containing only that number.
pub fn read_port_file(path: impl AsRef<Path>) -> Result<u16, String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read port file {}: {e}", path.display()))?;
    parse_port(&content).map_err(|e| format!("port file {}: {e}", path.display()))
}

fn parse_port(raw: &str) -> Result<u16, String> {
    match raw.trim().parse::<u16>() {
        Ok(0) => Err("port 0 is not a valid listen port".to_owned()),
        Ok(port) => Ok(port),
        Err(e) => Err(format!("invalid port {:?}: {e}", raw.trim())),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::log::NoopLogSink;
    use crate::log::log_level::LogLevel;
    use crate::log::CaptureLogSink;
    use rand::RngCore;

    fn unique_temp_path(prefix: &str) -> PathBuf {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        let suffix = u64::from_le_bytes(bytes);
        std::env::temp_dir().join(format!("{prefix}_{suffix}"))
    }

    #[test]
    fn parse_reads_sections_globals_and_comments() {
        let cfg = Config::parse(
            "# registry\nhost = 0.0.0.0\n\
             [Server]\nport = 4000\nname = \"quoted\"\n\
             [Store]\npath=/tmp/x\n",
        );
        assert_eq!(cfg.get_global("host"), Some("0.0.0.0"));
        assert_eq!(cfg.get("Server", "port"), Some("4000"));
        assert_eq!(cfg.get("Server", "name"), Some("quoted"));
        assert_eq!(cfg.get("Store", "path"), Some("/tmp/x"));
        assert_eq!(cfg.get("Store", "missing"), None);
    }

    #[test]
    fn server_settings_fall_back_to_defaults() {
        let cfg = Config::parse("[Server]\nport_file = /definitely/not/here/port.info\n");
        let log = CaptureLogSink::new();
        let settings = ServerSettings::from_config(&cfg, &log);

        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.max_payload_len, MAX_PAYLOAD_LEN);
        assert_eq!(settings.read_timeout, None);
        assert!(
            log.contains(LogLevel::Warn, "using 1234"),
            "missing port file should be reported: {:?}",
            log.lines()
        );
    }

    #[test]
    fn explicit_port_wins_over_port_file() {
        let cfg = Config::parse("[Server]\nhost = 0.0.0.0\nport = 4321\nread_timeout_secs = 5\n");
        let settings = ServerSettings::from_config(&cfg, &NoopLogSink);
        assert_eq!(settings.bind_addr(), "0.0.0.0:4321");
        assert_eq!(settings.read_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn port_file_is_read_and_trimmed() {
        let path = unique_temp_path("port_info");
        fs::write(&path, "1357\n").unwrap();

        let cfg = Config::parse(&format!("[Client]\nport_file = {}\n", path.display()));
        let settings = ClientSettings::from_config(&cfg, &NoopLogSink);
        assert_eq!(settings.port, 1357);
        assert_eq!(settings.name, DEFAULT_CLIENT_NAME);
        assert_eq!(settings.version, SERVER_VERSION);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn garbage_port_file_falls_back_to_default() {
        let path = unique_temp_path("port_info_bad");
        fs::write(&path, "not-a-port").unwrap();

        assert!(read_port_file(&path).is_err());
        let cfg = Config::parse(&format!("[Server]\nport_file = {}\n", path.display()));
        assert_eq!(resolve_port(&cfg, "Server", &NoopLogSink), DEFAULT_PORT);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn invalid_numbers_are_replaced_by_defaults() {
        let cfg = Config::parse("[Server]\nport = 0\nmax_payload_len = lots\n");
        let log = CaptureLogSink::new();
        let settings = ServerSettings::from_config(&cfg, &log);
        assert_eq!(settings.max_payload_len, MAX_PAYLOAD_LEN);
        assert!(log.contains(LogLevel::Warn, "max_payload_len"));
        assert!(log.contains(LogLevel::Warn, "port 0"));
    }
}
