use crate::protocol::ClientId;
use crate::store::{ClientIdentity, StoreError};

/// Upper bound on identifier draws per registration.
pub const MAX_ID_ATTEMPTS: usize = 16;

/// Storage seam used by registration.
///
/// Implementations keep the uniqueness invariant: no two stored identities
/// share a name or an identifier.
pub trait IdentityStore: Send {
    /// Exact, case-sensitive match.
    fn has_name(&self, name: &str) -> Result<bool, StoreError>;

    fn has_identifier(&self, id: &ClientId) -> Result<bool, StoreError>;

    /// Next identifier candidate, not yet checked for collisions.
    fn next_candidate(&mut self) -> ClientId;

    /// Commits one identity atomically, or leaves the store unchanged.
    fn insert(&mut self, identity: ClientIdentity) -> Result<(), StoreError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Draws candidates until one is not already stored.
    fn generate_unique_identifier(&mut self) -> Result<ClientId, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.next_candidate();
            if !self.has_identifier(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(StoreError::IdentifierExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }
}
