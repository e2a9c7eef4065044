use std::sync::Arc;

use crate::log::log_sink::LogSink;
use crate::log::NoopLogSink;
use crate::protocol::{
    ClientId, MAX_NAME_LEN, NAME_FIELD_LEN, ProtoError, Response, ResponseCode, SERVER_VERSION,
    decode_name,
};
use crate::registration::{RegistrationState, RejectReason};
use crate::store::{ClientIdentity, IdentityStore, StoreError};
use crate::{sink_error, sink_info};

/// Result of one registration exchange: the states it went through and the
/// response to write back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub trail: Vec<RegistrationState>,
    pub response: Response,
}

impl RegistrationOutcome {
    /// The `Accepted`/`Rejected` state the exchange settled on.
    pub fn decision(&self) -> Option<RegistrationState> {
        self.trail
            .iter()
            .copied()
            .find(|s| matches!(s, RegistrationState::Accepted(_) | RegistrationState::Rejected(_)))
    }

    pub fn accepted_id(&self) -> Option<ClientId> {
        match self.decision() {
            Some(RegistrationState::Accepted(id)) => Some(id),
            _ => None,
        }
    }

    pub fn reject_reason(&self) -> Option<RejectReason> {
        match self.decision() {
            Some(RegistrationState::Rejected(reason)) => Some(reason),
            _ => None,
        }
    }
}

/// Tracks the current state and records every step.
struct Exchange {
    state: RegistrationState,
    trail: Vec<RegistrationState>,
}

impl Exchange {
    fn new() -> Self {
        Self {
            state: RegistrationState::AwaitingRequest,
            trail: vec![RegistrationState::AwaitingRequest],
        }
    }

    fn advance(&mut self, next: RegistrationState) {
        debug_assert!(
            self.state.can_advance_to(&next),
            "illegal registration transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
        self.trail.push(next);
    }
}

/// Turns a registration payload into a decision and a response.
///
/// Storage is reached only through `IdentityStore`; exactly one insert
/// happens per accepted registration and none on rejection.
pub struct Registrar {
    server_version: u8,
    log: Arc<dyn LogSink>,
}

impl Default for Registrar {
    fn default() -> Self {
        Self::with_log(Arc::new(NoopLogSink))
    }
}

impl Registrar {
    pub fn with_log(log: Arc<dyn LogSink>) -> Self {
        Self {
            server_version: SERVER_VERSION,
            log,
        }
    }

    pub fn handle_registration(
        &self,
        store: &mut dyn IdentityStore,
        payload: &[u8],
        requested_version: u8,
    ) -> RegistrationOutcome {
        let mut exchange = Exchange::new();
        exchange.advance(RegistrationState::Validating);

        if requested_version != self.server_version {
            sink_info!(
                self.log,
                "client asked for protocol v{}, answering with v{}",
                requested_version,
                self.server_version
            );
        }

        let decision = match self.decide(store, payload) {
            Ok(id) => RegistrationState::Accepted(id),
            Err(reason) => {
                sink_info!(self.log, "registration rejected: {}", reason);
                RegistrationState::Rejected(reason)
            }
        };
        exchange.advance(decision);

        let response = match decision {
            RegistrationState::Accepted(id) => {
                Response::registration_success(self.server_version, id)
            }
            _ => Response::failure(self.server_version, ResponseCode::RegistrationFailed),
        };
        exchange.advance(RegistrationState::Responded);

        RegistrationOutcome {
            trail: exchange.trail,
            response,
        }
    }

    fn decide(
        &self,
        store: &mut dyn IdentityStore,
        payload: &[u8],
    ) -> Result<ClientId, RejectReason> {
        let name = validate_name(payload)?;

        match store.has_name(&name) {
            Ok(true) => return Err(RejectReason::NameTaken),
            Ok(false) => {}
            Err(e) => return Err(self.storage_failure("name lookup", &e)),
        }

        let id = store
            .generate_unique_identifier()
            .map_err(|e| self.storage_failure("identifier generation", &e))?;

        match store.insert(ClientIdentity::registered_now(id, name.as_str())) {
            Ok(()) => {}
            Err(StoreError::DuplicateName(_)) => return Err(RejectReason::NameTaken),
            Err(e) => return Err(self.storage_failure("insert", &e)),
        }

        sink_info!(self.log, "registered {:?} as {}", name, id);
        Ok(id)
    }

    fn storage_failure(&self, stage: &str, err: &StoreError) -> RejectReason {
        sink_error!(self.log, "identity store {} failed: {}", stage, err);
        RejectReason::StorageFailure
    }
}

fn validate_name(payload: &[u8]) -> Result<String, RejectReason> {
    if payload.len() > NAME_FIELD_LEN {
        return Err(RejectReason::NameTooLong);
    }
    let name = decode_name(payload).map_err(|e| match e {
        ProtoError::NameTooLong { .. } => RejectReason::NameTooLong,
        _ => RejectReason::InvalidEncoding,
    })?;
    // A full field with no terminator decodes to more than fits on re-encode.
    if name.len() > MAX_NAME_LEN {
        return Err(RejectReason::NameTooLong);
    }
    if name.is_empty() {
        return Err(RejectReason::EmptyName);
    }
    Ok(name)
}
