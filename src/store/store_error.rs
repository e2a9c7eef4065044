use std::{fmt, io};

use crate::protocol::ClientId;

#[derive(Debug)]
pub enum StoreError {
    DuplicateIdentifier(ClientId),
    DuplicateName(String),
    /// No free identifier after the bounded number of draws.
    IdentifierExhausted { attempts: usize },
    /// Store was configured to refuse writes.
    WriteRefused,
    /// Store was configured to fail lookups.
    LookupFailed,
    Io(io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIdentifier(id) => write!(f, "identifier {id} already stored"),
            Self::DuplicateName(name) => write!(f, "name {name:?} already stored"),
            Self::IdentifierExhausted { attempts } => {
                write!(f, "no unused identifier after {attempts} attempts")
            }
            Self::WriteRefused => write!(f, "store refused the write"),
            Self::LookupFailed => write!(f, "store lookup failed"),
            Self::Io(e) => write!(f, "store IO error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
