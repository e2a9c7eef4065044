use crate::protocol::ClientId;
use crate::registration::RejectReason;

/// States of one registration exchange.
///
/// `AwaitingRequest -> Validating -> Accepted | Rejected -> Responded`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    AwaitingRequest,
    Validating,
    Accepted(ClientId),
    Rejected(RejectReason),
    Responded,
}

impl RegistrationState {
    pub fn can_advance_to(&self, next: &RegistrationState) -> bool {
        use RegistrationState::*;
        matches!(
            (self, next),
            (AwaitingRequest, Validating)
                | (Validating, Accepted(_))
                | (Validating, Rejected(_))
                | (Accepted(_), Responded)
                | (Rejected(_), Responded)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RegistrationState::Responded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RegistrationState::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        let id = ClientId::nil();
        assert!(AwaitingRequest.can_advance_to(&Validating));
        assert!(Validating.can_advance_to(&Accepted(id)));
        assert!(Validating.can_advance_to(&Rejected(RejectReason::NameTaken)));
        assert!(Accepted(id).can_advance_to(&Responded));
        assert!(Rejected(RejectReason::EmptyName).can_advance_to(&Responded));
        assert!(Responded.is_terminal());
    }

    #[test]
    fn shortcuts_and_reversals_are_illegal() {
        let id = ClientId::nil();
        assert!(!AwaitingRequest.can_advance_to(&Accepted(id)));
        assert!(!Validating.can_advance_to(&Responded));
        assert!(!Accepted(id).can_advance_to(&Rejected(RejectReason::StorageFailure)));
        assert!(!Responded.can_advance_to(&AwaitingRequest));
    }
}
