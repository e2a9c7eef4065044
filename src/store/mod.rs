//! Client identity persistence.
mod client_identity;
mod file_identity_store;
mod hex;
mod id_source;
mod identity_store;
mod in_memory_identity_store;
mod store_error;

pub use client_identity::ClientIdentity;
pub use file_identity_store::{CLIENTS_TABLE, FILES_TABLE, FileIdentityStore};
pub use id_source::{IdSource, ScriptedIdSource, TimeOrderedIdSource};
pub use identity_store::{IdentityStore, MAX_ID_ATTEMPTS};
pub use in_memory_identity_store::InMemoryIdentityStore;
pub use store_error::StoreError;
