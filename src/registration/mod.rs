//! Registration: name validation, uniqueness check, identifier issuance.
mod registrar;
mod registration_state;
mod reject_reason;

pub use registrar::{Registrar, RegistrationOutcome};
pub use registration_state::RegistrationState;
pub use reject_reason::RejectReason;
