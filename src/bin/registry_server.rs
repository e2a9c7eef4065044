use std::sync::Arc;
use std::{env, process};

use client_registry::config::{Config, ServerSettings};
use client_registry::log::log_sink::LogSink;
use client_registry::log::logger::Logger;
use client_registry::server::run::run_registry_server_with_log;
use client_registry::{logger_error, logger_info};

const CONFIG_ENV: &str = "REGISTRY_CONFIG";
const DEFAULT_CONFIG: &str = "registry.conf";

fn main() {
    // --- Parse CLI args ----------------------------------------------------
    //
    // Supported:
    //   registry_server               -> $REGISTRY_CONFIG or ./registry.conf
    //   registry_server my.conf       -> my.conf
    let args: Vec<String> = env::args().collect();
    let config_path = match args.len() {
        1 => env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG.to_owned()),
        2 => args[1].clone(),
        _ => {
            eprintln!("Usage:");
            eprintln!("  {}            # config from ${CONFIG_ENV} or {DEFAULT_CONFIG}", args[0]);
            eprintln!("  {} [CONFIG]   # e.g. server.conf", args[0]);
            process::exit(2);
        }
    };

    let config = Config::load(&config_path).unwrap_or_else(|e| {
        eprintln!("[registry_server] {e}; using defaults");
        Config::empty()
    });

    // --- Start process logger ----------------------------------------------
    let logger = Logger::start_server(1024, &config);
    let log_sink: Arc<dyn LogSink> = Arc::new(logger.handle());

    let settings = ServerSettings::from_config(&config, log_sink.as_ref());
    logger_info!(
        logger,
        "starting on {} with store {:?}",
        settings.bind_addr(),
        settings.store_path
    );
    eprintln!("[registry_server] starting on {}", settings.bind_addr());

    // --- Serve one connection (blocks) -------------------------------------
    let code = match run_registry_server_with_log(settings, log_sink) {
        Ok(end) => {
            logger_info!(logger, "connection finished: {:?}", end);
            0
        }
        Err(e) => {
            logger_error!(logger, "registry server failed: {}", e);
            eprintln!("[registry_server] {e}");
            1
        }
    };

    logger.shutdown();
    process::exit(code);
}
