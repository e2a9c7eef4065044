//! Single-connection registry server: accept, read, dispatch, respond.
mod connection;
mod dispatcher;
mod handlers;
mod registry_server;
mod request_handler;
pub mod run;

pub use connection::{Connection, ConnectionEnd};
pub use dispatcher::Dispatcher;
pub use handlers::{InvalidCodeHandler, RegistrationHandler, StubHandler};
pub use registry_server::{RegistryServer, serve_connection};
pub use request_handler::RequestHandler;
