use std::sync::Arc;

use crate::log::log_sink::LogSink;
use crate::protocol::{OpCode, Request, Response, ResponseCode, SERVER_VERSION};
use crate::registration::Registrar;
use crate::server::RequestHandler;
use crate::store::IdentityStore;
use crate::{sink_info, sink_warn};

/// `OpCode::Registration`.
pub struct RegistrationHandler {
    registrar: Registrar,
}

impl RegistrationHandler {
    pub fn new(registrar: Registrar) -> Self {
        Self { registrar }
    }
}

impl RequestHandler for RegistrationHandler {
    fn handle(&mut self, request: &Request, store: &mut dyn IdentityStore) -> Response {
        self.registrar
            .handle_registration(store, &request.payload, request.header.version)
            .response
    }
}

/// Operations that are recognized but not implemented (public key, file upload).
pub struct StubHandler {
    log: Arc<dyn LogSink>,
}

impl StubHandler {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }
}

impl RequestHandler for StubHandler {
    fn handle(&mut self, request: &Request, _store: &mut dyn IdentityStore) -> Response {
        let what = request.header.op().map(OpCode::name).unwrap_or("unknown");
        sink_info!(
            self.log,
            "{} request from {} ({} bytes) is not supported",
            what,
            request.header.client_id,
            request.payload.len()
        );
        Response::failure(SERVER_VERSION, ResponseCode::GeneralFailure)
    }
}

/// Codes outside the operation table.
pub struct InvalidCodeHandler {
    log: Arc<dyn LogSink>,
}

impl InvalidCodeHandler {
    pub fn new(log: Arc<dyn LogSink>) -> Self {
        Self { log }
    }
}

impl RequestHandler for InvalidCodeHandler {
    fn handle(&mut self, request: &Request, _store: &mut dyn IdentityStore) -> Response {
        sink_warn!(
            self.log,
            "unknown op code {} from {}",
            request.header.op_code,
            request.header.client_id
        );
        Response::failure(SERVER_VERSION, ResponseCode::GeneralFailure)
    }
}
