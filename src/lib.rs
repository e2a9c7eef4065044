//! Client registry: a minimal registration handshake over raw TCP.
//!
//! A client sends its name; the server checks it is unused, issues a unique
//! identifier, persists the identity and answers with the identifier.
//!
//! It provides two binaries:
//! - `registry_server`: serves one client connection against a file-backed store.
//! - `registry_client`: registers a name and prints the issued identifier.

/// Registry client for talking to the server.
pub mod client;
/// Wall-clock helpers (timestamps for records and log files).
pub mod clock;
/// Handles configuration loading and management.
pub mod config;
/// Logging utilities for the application.
pub mod log;
/// Binary request/response framing and the name field codec.
pub mod protocol;
/// Registration state machine and decision logic.
pub mod registration;
/// Single-connection server loop and operation dispatch.
pub mod server;
/// Identity persistence and uniqueness rules.
pub mod store;
