use crate::protocol::ClientId;
use crate::store::{ClientIdentity, IdSource, IdentityStore, StoreError, TimeOrderedIdSource};

/// Simple in-memory identity store.
///
/// We use this in tests and in "dev mode" runs. It can be told to fail
/// lookups or writes to exercise storage-failure paths.
pub struct InMemoryIdentityStore {
    records: Vec<ClientIdentity>,
    id_source: Box<dyn IdSource>,
    fail_lookups: bool,
    fail_writes: bool,
    writes: usize,
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            id_source: Box::new(TimeOrderedIdSource),
            fail_lookups: false,
            fail_writes: false,
            writes: 0,
        }
    }

    /// Convenient builder-style helper.
    pub fn with_identity(mut self, id: ClientId, name: impl Into<String>) -> Self {
        self.records
            .push(ClientIdentity::new(id, name, "1970-01-01 00:00:00"));
        self
    }

    pub fn with_id_source(mut self, source: impl IdSource + 'static) -> Self {
        self.id_source = Box::new(source);
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    /// Successful inserts since construction (builder seeds excluded).
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get_by_name(&self, name: &str) -> Option<&ClientIdentity> {
        self.records.iter().find(|r| r.name == name)
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn has_name(&self, name: &str) -> Result<bool, StoreError> {
        if self.fail_lookups {
            return Err(StoreError::LookupFailed);
        }
        Ok(self.records.iter().any(|r| r.name == name))
    }

    fn has_identifier(&self, id: &ClientId) -> Result<bool, StoreError> {
        if self.fail_lookups {
            return Err(StoreError::LookupFailed);
        }
        Ok(self.records.iter().any(|r| r.id == *id))
    }

    fn next_candidate(&mut self) -> ClientId {
        self.id_source.next_id()
    }

    fn insert(&mut self, identity: ClientIdentity) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::WriteRefused);
        }
        if self.records.iter().any(|r| r.id == identity.id) {
            return Err(StoreError::DuplicateIdentifier(identity.id));
        }
        if self.records.iter().any(|r| r.name == identity.name) {
            return Err(StoreError::DuplicateName(identity.name));
        }
        self.records.push(identity);
        self.writes += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
