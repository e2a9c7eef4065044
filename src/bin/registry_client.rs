use std::sync::Arc;
use std::{env, process};

use client_registry::client::RegistryClient;
use client_registry::config::{ClientSettings, Config};
use client_registry::log::log_sink::LogSink;
use client_registry::log::logger::Logger;
use client_registry::{logger_error, logger_info};

const CONFIG_ENV: &str = "REGISTRY_CONFIG";
const DEFAULT_CONFIG: &str = "registry.conf";

fn main() {
    // --- Parse CLI args ----------------------------------------------------
    //
    // Supported:
    //   registry_client                  -> name from config (default "guest")
    //   registry_client alice            -> register "alice"
    //   registry_client alice my.conf    -> register "alice" using my.conf
    let args: Vec<String> = env::args().collect();
    let (name_arg, config_path) = match args.len() {
        1 => (None, default_config_path()),
        2 => (Some(args[1].clone()), default_config_path()),
        3 => (Some(args[1].clone()), args[2].clone()),
        _ => {
            eprintln!("Usage:");
            eprintln!("  {}                 # name from config", args[0]);
            eprintln!("  {} [NAME]          # e.g. alice", args[0]);
            eprintln!("  {} [NAME] [CONFIG] # e.g. alice client.conf", args[0]);
            process::exit(2);
        }
    };

    let config = Config::load(&config_path).unwrap_or_else(|e| {
        eprintln!("[registry_client] {e}; using defaults");
        Config::empty()
    });

    let logger = Logger::start_client(256, &config);
    let log_sink: Arc<dyn LogSink> = Arc::new(logger.handle());

    let mut settings = ClientSettings::from_config(&config, log_sink.as_ref());
    if let Some(name) = name_arg {
        settings.name = name;
    }

    let code = match register(&settings, log_sink) {
        Ok(id) => {
            logger_info!(logger, "{:?} registered as {}", settings.name, id);
            println!("{id}");
            0
        }
        Err(e) => {
            logger_error!(logger, "registration of {:?} failed: {}", settings.name, e);
            eprintln!("[registry_client] {e}");
            1
        }
    };

    logger.shutdown();
    process::exit(code);
}

fn register(
    settings: &ClientSettings,
    log: Arc<dyn LogSink>,
) -> Result<client_registry::protocol::ClientId, client_registry::client::ClientError> {
    let mut client = RegistryClient::connect(settings.server_addr(), settings.version, log)?;
    client.register(&settings.name)
}

fn default_config_path() -> String {
    env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG.to_owned())
}
