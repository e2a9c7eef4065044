use std::fmt;

/// Why a registration was refused. Never sent to the peer; the wire only
/// carries `RegistrationFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    InvalidEncoding,
    NameTooLong,
    EmptyName,
    NameTaken,
    StorageFailure,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::InvalidEncoding => "name is not valid UTF-8",
            RejectReason::NameTooLong => "name does not fit the name field",
            RejectReason::EmptyName => "name is empty",
            RejectReason::NameTaken => "name already registered",
            RejectReason::StorageFailure => "identity store failure",
        };
        f.write_str(s)
    }
}
