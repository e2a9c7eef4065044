use byteorder::{ByteOrder, LittleEndian};

use super::{
    ClientId, OpCode, ProtoError, REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN, ResponseCode,
};

// ---- Request header ------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub client_id: ClientId,
    pub version: u8,
    /// Raw code; unknown values still reach the dispatcher.
    pub op_code: u16,
    pub payload_size: u32,
}

impl RequestHeader {
    pub fn op(&self) -> Result<OpCode, ProtoError> {
        OpCode::from_u16(self.op_code)
    }

    pub fn to_bytes(&self) -> [u8; REQUEST_HEADER_LEN] {
        encode_request_header(self.client_id, self.version, self.op_code, self.payload_size)
    }
}

pub fn encode_request_header(
    client_id: ClientId,
    version: u8,
    op_code: u16,
    payload_size: u32,
) -> [u8; REQUEST_HEADER_LEN] {
    let mut out = [0u8; REQUEST_HEADER_LEN];
    out[..ClientId::WIRE_LEN].copy_from_slice(&client_id.to_wire_bytes());
    out[16] = version;
    LittleEndian::write_u16(&mut out[17..19], op_code);
    LittleEndian::write_u32(&mut out[19..23], payload_size);
    out
}

/// Decodes the first `REQUEST_HEADER_LEN` bytes; anything after is ignored.
pub fn decode_request_header(bytes: &[u8]) -> Result<RequestHeader, ProtoError> {
    if bytes.len() < REQUEST_HEADER_LEN {
        return Err(ProtoError::MalformedHeader {
            expected: REQUEST_HEADER_LEN,
            actual: bytes.len(),
        });
    }
    let client_id = ClientId::from_wire_slice(bytes).ok_or(ProtoError::MalformedHeader {
        expected: REQUEST_HEADER_LEN,
        actual: bytes.len(),
    })?;
    Ok(RequestHeader {
        client_id,
        version: bytes[16],
        op_code: LittleEndian::read_u16(&bytes[17..19]),
        payload_size: LittleEndian::read_u32(&bytes[19..23]),
    })
}

// ---- Response header -----------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub version: u8,
    pub code: u16,
    pub payload_size: u32,
}

impl ResponseHeader {
    pub fn response_code(&self) -> Result<ResponseCode, ProtoError> {
        ResponseCode::from_u16(self.code)
    }

    pub fn to_bytes(&self) -> [u8; RESPONSE_HEADER_LEN] {
        encode_response_header(self.version, self.code, self.payload_size)
    }
}

pub fn encode_response_header(
    version: u8,
    code: u16,
    payload_size: u32,
) -> [u8; RESPONSE_HEADER_LEN] {
    let mut out = [0u8; RESPONSE_HEADER_LEN];
    out[0] = version;
    LittleEndian::write_u16(&mut out[1..3], code);
    LittleEndian::write_u32(&mut out[3..7], payload_size);
    out
}

pub fn decode_response_header(bytes: &[u8]) -> Result<ResponseHeader, ProtoError> {
    if bytes.len() < RESPONSE_HEADER_LEN {
        return Err(ProtoError::MalformedHeader {
            expected: RESPONSE_HEADER_LEN,
            actual: bytes.len(),
        });
    }
    Ok(ResponseHeader {
        version: bytes[0],
        code: LittleEndian::read_u16(&bytes[1..3]),
        payload_size: LittleEndian::read_u32(&bytes[3..7]),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn request_header_layout_is_little_endian() {
        let bytes = encode_request_header(ClientId::nil(), 1, 1100, 255);
        assert_eq!(bytes.len(), 23);
        assert!(bytes[..16].iter().all(|&b| b == 0));
        assert_eq!(bytes[16], 1);
        assert_eq!(&bytes[17..19], &[0x4c, 0x04]); // 1100
        assert_eq!(&bytes[19..23], &[0xff, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn request_header_decodes_what_was_encoded() {
        let id = ClientId::time_ordered(1_700_000_000_123, &[3u8; 10]);
        let header = RequestHeader {
            client_id: id,
            version: 2,
            op_code: 1103,
            payload_size: 70_000,
        };
        let decoded = decode_request_header(&header.to_bytes()).unwrap();
        assert_eq!(decoded, header);
        assert_eq!(decoded.op(), Ok(OpCode::FileUpload));
    }

    #[test]
    fn truncated_request_header_is_malformed() {
        let bytes = encode_request_header(ClientId::nil(), 1, 1100, 0);
        for cut in [0, 1, 16, 22] {
            assert_eq!(
                decode_request_header(&bytes[..cut]),
                Err(ProtoError::MalformedHeader {
                    expected: 23,
                    actual: cut
                })
            );
        }
    }

    #[test]
    fn response_header_layout_is_little_endian() {
        let bytes = encode_response_header(1, 2100, 16);
        assert_eq!(bytes, [0x01, 0x34, 0x08, 0x10, 0x00, 0x00, 0x00]);
        let decoded = decode_response_header(&bytes).unwrap();
        assert_eq!(decoded.response_code(), Ok(ResponseCode::RegistrationSuccess));
        assert_eq!(decoded.payload_size, 16);
    }

    #[test]
    fn truncated_response_header_is_malformed() {
        assert_eq!(
            decode_response_header(&[1, 2, 3]),
            Err(ProtoError::MalformedHeader {
                expected: 7,
                actual: 3
            })
        );
    }
}
