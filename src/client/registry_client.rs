use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;

use crate::client::ClientError;
use crate::log::log_sink::LogSink;
use crate::protocol::{ClientId, MAX_PAYLOAD_LEN, Request, Response, read_response, write_request};
use crate::{sink_debug, sink_info};

/// Speaks the registry protocol over any blocking stream.
///
/// Starts with the nil identity; a successful `register` replaces it with
/// the identifier the server issued.
pub struct RegistryClient<S> {
    stream: S,
    client_id: ClientId,
    version: u8,
    log: Arc<dyn LogSink>,
}

impl RegistryClient<TcpStream> {
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        version: u8,
        log: Arc<dyn LogSink>,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)?;
        if let Ok(peer) = stream.peer_addr() {
            sink_info!(log, "connected to registry server at {}", peer);
        }
        Ok(Self::from_stream(stream, version, log))
    }
}

impl<S> RegistryClient<S>
where
    S: Read + Write,
{
    pub fn from_stream(stream: S, version: u8, log: Arc<dyn LogSink>) -> Self {
        Self {
            stream,
            client_id: ClientId::nil(),
            version,
            log,
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Sends one request under the current identity and waits for the reply.
    pub fn send_request(
        &mut self,
        op_code: u16,
        payload: Vec<u8>,
    ) -> Result<Response, ClientError> {
        let req = Request::new(self.client_id, self.version, op_code, payload)?;
        self.exchange(&req)
    }

    /// Registers `name` and returns the issued identifier.
    pub fn register(&mut self, name: &str) -> Result<ClientId, ClientError> {
        let req = Request::registration(self.client_id, self.version, name)?;
        let resp = self.exchange(&req)?;

        let code = resp.code()?;
        if !code.is_success() {
            sink_info!(
                self.log,
                "registration of {:?} refused ({})",
                name,
                code.as_u16()
            );
            return Err(ClientError::Rejected(code));
        }

        let id = resp.issued_id().ok_or(ClientError::ShortPayload {
            expected: ClientId::WIRE_LEN,
            actual: resp.payload.len(),
        })?;
        sink_info!(self.log, "registered {:?} as {}", name, id);
        self.client_id = id;
        Ok(id)
    }

    fn exchange(&mut self, req: &Request) -> Result<Response, ClientError> {
        write_request(&mut self.stream, req)?;
        let resp = read_response(&mut self.stream, MAX_PAYLOAD_LEN)?;
        sink_debug!(
            self.log,
            "op {} -> code {} ({} payload bytes)",
            req.header.op_code,
            resp.header.code,
            resp.payload.len()
        );
        Ok(resp)
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}
