use std::{fmt, io};

/// Protocol-level errors (header layout, payload contracts, unknown codes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    /// Fewer bytes than a fixed-size header were available.
    MalformedHeader { expected: usize, actual: usize },
    UnknownOperation(u16),
    UnknownResponseCode(u16),
    /// Name plus terminator does not fit the fixed field.
    NameTooLong { max: usize, actual: usize },
    /// Name bytes are not valid UTF-8.
    InvalidEncoding,
    InvalidIdentifier(String),
    /// Declared payload size exceeds the configured maximum.
    PayloadTooLarge { max: usize, declared: usize },
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader { expected, actual } => {
                write!(f, "malformed header: expected {expected} bytes, got {actual}")
            }
            Self::UnknownOperation(code) => write!(f, "unknown operation code {code}"),
            Self::UnknownResponseCode(code) => write!(f, "unknown response code {code}"),
            Self::NameTooLong { max, actual } => {
                write!(f, "name too long: {actual} bytes, field holds {max}")
            }
            Self::InvalidEncoding => write!(f, "name is not valid UTF-8"),
            Self::InvalidIdentifier(raw) => write!(f, "invalid client identifier {raw:?}"),
            Self::PayloadTooLarge { max, declared } => {
                write!(f, "declared payload of {declared} bytes exceeds limit of {max}")
            }
        }
    }
}

impl std::error::Error for ProtoError {}

/// Frame-level error wrapper: IO vs protocol.
#[derive(Debug)]
pub enum FrameError {
    Io(io::Error),
    Proto(ProtoError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Proto(e) => write!(f, "protocol error: {e}"),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Proto(e) => Some(e),
        }
    }
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ProtoError> for FrameError {
    fn from(e: ProtoError) -> Self {
        Self::Proto(e)
    }
}
