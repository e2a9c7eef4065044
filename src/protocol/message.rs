use super::{
    ClientId, NAME_FIELD_LEN, OpCode, ProtoError, RequestHeader, ResponseCode, ResponseHeader,
    encode_name,
};

/// A decoded request: header plus exactly `payload_size` payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub header: RequestHeader,
    pub payload: Vec<u8>,
}

impl Request {
    /// Registration request carrying `name` in a full-width name field.
    pub fn registration(client_id: ClientId, version: u8, name: &str) -> Result<Self, ProtoError> {
        let payload = encode_name(name)?;
        debug_assert_eq!(payload.len(), NAME_FIELD_LEN);
        Self::new(client_id, version, OpCode::Registration.as_u16(), payload)
    }

    /// Fails if the payload length does not fit the 32-bit size field.
    pub fn new(
        client_id: ClientId,
        version: u8,
        op_code: u16,
        payload: Vec<u8>,
    ) -> Result<Self, ProtoError> {
        Ok(Self {
            header: RequestHeader {
                client_id,
                version,
                op_code,
                payload_size: payload_size(payload.len())?,
            },
            payload,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub header: ResponseHeader,
    pub payload: Vec<u8>,
}

impl Response {
    /// Fails if the payload length does not fit the 32-bit size field.
    pub fn new(version: u8, code: ResponseCode, payload: Vec<u8>) -> Result<Self, ProtoError> {
        Ok(Self {
            header: ResponseHeader {
                version,
                code: code.as_u16(),
                payload_size: payload_size(payload.len())?,
            },
            payload,
        })
    }

    /// Failure responses always carry an empty payload.
    pub fn failure(version: u8, code: ResponseCode) -> Self {
        Self {
            header: ResponseHeader {
                version,
                code: code.as_u16(),
                payload_size: 0,
            },
            payload: Vec::new(),
        }
    }

    pub fn registration_success(version: u8, id: ClientId) -> Self {
        Self {
            header: ResponseHeader {
                version,
                code: ResponseCode::RegistrationSuccess.as_u16(),
                payload_size: ClientId::WIRE_LEN as u32,
            },
            payload: id.to_wire_bytes().to_vec(),
        }
    }

    pub fn code(&self) -> Result<ResponseCode, ProtoError> {
        self.header.response_code()
    }

    /// Identifier carried by a registration success, if any.
    pub fn issued_id(&self) -> Option<ClientId> {
        match self.code() {
            Ok(ResponseCode::RegistrationSuccess) => ClientId::from_wire_slice(&self.payload),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(super::RESPONSE_HEADER_LEN + self.payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }
}

fn payload_size(len: usize) -> Result<u32, ProtoError> {
    u32::try_from(len).map_err(|_| ProtoError::PayloadTooLarge {
        max: u32::MAX as usize,
        declared: len,
    })
}
