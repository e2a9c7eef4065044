use std::{fmt, io};

use crate::protocol::{FrameError, ProtoError, ResponseCode};

/// Errors that can occur while talking to the registry server.
#[derive(Debug)]
pub enum ClientError {
    Io(io::Error),
    Frame(FrameError),
    /// Request could not be encoded, or the response was not understood.
    Proto(ProtoError),
    /// Server answered with a failure code.
    Rejected(ResponseCode),
    /// Success response whose payload is not an identifier.
    ShortPayload { expected: usize, actual: usize },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Frame(e) => write!(f, "frame error: {e}"),
            Self::Proto(e) => write!(f, "protocol error: {e}"),
            Self::Rejected(code) => {
                write!(f, "server rejected request: {code:?} ({})", code.as_u16())
            }
            Self::ShortPayload { expected, actual } => {
                write!(f, "response payload has {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<FrameError> for ClientError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl From<ProtoError> for ClientError {
    fn from(e: ProtoError) -> Self {
        Self::Proto(e)
    }
}
