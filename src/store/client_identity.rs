use crate::clock;
use crate::protocol::ClientId;

/// One registered client. Created on successful registration, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub id: ClientId,
    pub name: String,
    /// Reserved for key exchange; always empty at registration.
    pub public_key: Option<Vec<u8>>,
    /// UTC, `YYYY-MM-DD HH:MM:SS`.
    pub last_seen: String,
    /// Reserved for key exchange; always empty at registration.
    pub aes_key: Option<Vec<u8>>,
}

impl ClientIdentity {
    pub fn new(id: ClientId, name: impl Into<String>, last_seen: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            public_key: None,
            last_seen: last_seen.into(),
            aes_key: None,
        }
    }

    /// Identity stamped with the current server time.
    pub fn registered_now(id: ClientId, name: impl Into<String>) -> Self {
        Self::new(id, name, clock::utc_datetime_now())
    }
}
