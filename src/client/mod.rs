//! Blocking registry client.
mod client_error;
mod registry_client;

pub use client_error::ClientError;
pub use registry_client::RegistryClient;
