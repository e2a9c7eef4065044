use std::sync::Arc;

use crate::log::NoopLogSink;
use crate::log::log_sink::LogSink;
use crate::protocol::{OpCode, Request, Response};
use crate::registration::Registrar;
use crate::server::{InvalidCodeHandler, RegistrationHandler, RequestHandler, StubHandler};
use crate::store::IdentityStore;

/// Routes a request to its handler by operation code.
pub struct Dispatcher {
    registration: RegistrationHandler,
    stub: StubHandler,
    invalid: InvalidCodeHandler,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_log(Arc::new(NoopLogSink))
    }
}

impl Dispatcher {
    pub fn with_log(log: Arc<dyn LogSink>) -> Self {
        Self {
            registration: RegistrationHandler::new(Registrar::with_log(log.clone())),
            stub: StubHandler::new(log.clone()),
            invalid: InvalidCodeHandler::new(log),
        }
    }

    fn handler_for(&mut self, op_code: u16) -> &mut dyn RequestHandler {
        match OpCode::from_u16(op_code) {
            Ok(OpCode::Registration) => &mut self.registration,
            Ok(OpCode::PublicKey | OpCode::FileUpload) => &mut self.stub,
            Err(_) => &mut self.invalid,
        }
    }

    pub fn dispatch(&mut self, request: &Request, store: &mut dyn IdentityStore) -> Response {
        self.handler_for(request.header.op_code)
            .handle(request, store)
    }
}
