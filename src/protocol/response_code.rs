use super::ProtoError;

/// Response codes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[repr(u16)]
pub enum ResponseCode {
    RegistrationSuccess = 2100,
    RegistrationFailed = 2101,
    /// Unknown operation, unimplemented operation or oversized payload.
    GeneralFailure = 2107,
}

impl ResponseCode {
    pub fn from_u16(v: u16) -> Result<ResponseCode, ProtoError> {
        match v {
            2100 => Ok(ResponseCode::RegistrationSuccess),
            2101 => Ok(ResponseCode::RegistrationFailed),
            2107 => Ok(ResponseCode::GeneralFailure),
            other => Err(ProtoError::UnknownResponseCode(other)),
        }
    }

    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn is_success(self) -> bool {
        matches!(self, ResponseCode::RegistrationSuccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_fixed_values() {
        assert_eq!(ResponseCode::RegistrationSuccess.as_u16(), 2100);
        assert_eq!(ResponseCode::RegistrationFailed.as_u16(), 2101);
        assert_eq!(ResponseCode::GeneralFailure.as_u16(), 2107);
        assert_eq!(
            ResponseCode::from_u16(2107),
            Ok(ResponseCode::GeneralFailure)
        );
        assert!(ResponseCode::from_u16(2102).is_err());
    }

    #[test]
    fn only_registration_success_is_success() {
        assert!(ResponseCode::RegistrationSuccess.is_success());
        assert!(!ResponseCode::RegistrationFailed.is_success());
        assert!(!ResponseCode::GeneralFailure.is_success());
    }
}
