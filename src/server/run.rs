use std::io;
use std::sync::Arc;

use crate::config::ServerSettings;
use crate::log::log_sink::LogSink;
use crate::server::{ConnectionEnd, RegistryServer};
use crate::store::FileIdentityStore;

/// Open the file store at `settings.store_path`, bind, and serve one
/// connection to completion.
pub fn run_registry_server_with_log(
    settings: ServerSettings,
    log: Arc<dyn LogSink>,
) -> io::Result<ConnectionEnd> {
    let store = FileIdentityStore::open(&settings.store_path, log.clone())?;
    let mut server = RegistryServer::bind(settings, store, log)?;
    server.serve_one()
}
