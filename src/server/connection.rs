use std::io::{self, Read, Write};

use crate::protocol::{FrameError, Request, Response, read_request, write_response};

/// Thin wrapper over a blocking stream that speaks in `Request`/`Response`.
pub struct Connection<S> {
    pub peer: String,
    stream: S,
    max_payload: usize,
}

impl<S> Connection<S>
where
    S: Read + Write,
{
    pub fn new(peer: impl Into<String>, stream: S, max_payload: usize) -> Self {
        Self {
            peer: peer.into(),
            stream,
            max_payload,
        }
    }

    /// `Ok(None)` when the peer closed between requests.
    pub fn recv(&mut self) -> Result<Option<Request>, FrameError> {
        read_request(&mut self.stream, self.max_payload)
    }

    pub fn send(&mut self, resp: &Response) -> io::Result<()> {
        write_response(&mut self.stream, resp)
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// How a served connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEnd {
    /// Zero bytes at a request boundary.
    PeerClosed,
    /// Header cut short or otherwise undecodable.
    ProtocolError,
    /// Declared payload above the limit; a failure response was attempted.
    PayloadTooLarge,
    Io(io::ErrorKind),
}
