use super::ProtoError;

/// Request operation codes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum OpCode {
    Registration = 1100,
    PublicKey = 1101,
    FileUpload = 1103,
}

impl OpCode {
    pub fn from_u16(v: u16) -> Result<OpCode, ProtoError> {
        use OpCode::*;
        match v {
            1100 => Ok(Registration),
            1101 => Ok(PublicKey),
            1103 => Ok(FileUpload),
            other => Err(ProtoError::UnknownOperation(other)),
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::Registration => "registration",
            OpCode::PublicKey => "public-key exchange",
            OpCode::FileUpload => "file upload",
        }
    }
}
