use std::io::{self, Read, Write};

use super::{
    FrameError, ProtoError, REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN, Request, Response,
    decode_request_header, decode_response_header,
};

/// Read one request, enforcing a max payload length before allocating.
///
/// `Ok(None)` means the peer closed the stream on a request boundary.
/// A header cut short by EOF is `ProtoError::MalformedHeader`.
pub fn read_request<R: Read>(
    r: &mut R,
    max_payload: usize,
) -> Result<Option<Request>, FrameError> {
    let mut raw = [0u8; REQUEST_HEADER_LEN];
    let got = read_up_to(r, &mut raw)?;
    if got == 0 {
        return Ok(None);
    }
    let header = decode_request_header(&raw[..got])?;
    let payload = read_payload(r, header.payload_size, max_payload)?;
    Ok(Some(Request { header, payload }))
}

/// Read one response (client side). EOF anywhere is an error here.
pub fn read_response<R: Read>(r: &mut R, max_payload: usize) -> Result<Response, FrameError> {
    let mut raw = [0u8; RESPONSE_HEADER_LEN];
    let got = read_up_to(r, &mut raw)?;
    let header = decode_response_header(&raw[..got])?;
    let payload = read_payload(r, header.payload_size, max_payload)?;
    Ok(Response { header, payload })
}

pub fn write_request<W: Write>(w: &mut W, req: &Request) -> io::Result<()> {
    check_payload_len(&req.payload)?;
    w.write_all(&req.header.to_bytes())?;
    w.write_all(&req.payload)?;
    w.flush()
}

pub fn write_response<W: Write>(w: &mut W, resp: &Response) -> io::Result<()> {
    check_payload_len(&resp.payload)?;
    w.write_all(&resp.to_bytes())?;
    w.flush()
}

fn check_payload_len(payload: &[u8]) -> io::Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "payload too large",
        ));
    }
    Ok(())
}

fn read_payload<R: Read>(
    r: &mut R,
    declared: u32,
    max_payload: usize,
) -> Result<Vec<u8>, FrameError> {
    let len = declared as usize;
    if len > max_payload {
        return Err(ProtoError::PayloadTooLarge {
            max: max_payload,
            declared: len,
        }
        .into());
    }
    let mut body = vec![0u8; len];
    r.read_exact(&mut body)?; // io::Error -> FrameError::Io
    Ok(body)
}

/// Like `read_exact`, but reports how many bytes arrived before EOF.
fn read_up_to<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::protocol::{ClientId, MAX_PAYLOAD_LEN, ResponseCode, encode_request_header};
    use std::io::Cursor;

    #[test]
    fn request_is_read_back_from_stream() {
        let req = Request::registration(ClientId::nil(), 1, "alice").unwrap();
        let mut wire = Vec::new();
        write_request(&mut wire, &req).unwrap();

        let mut cursor = Cursor::new(wire);
        let got = read_request(&mut cursor, MAX_PAYLOAD_LEN).unwrap();
        assert_eq!(got, Some(req));
        assert_eq!(read_request(&mut cursor, MAX_PAYLOAD_LEN).unwrap(), None);
    }

    #[test]
    fn empty_stream_is_a_clean_close() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_request(&mut cursor, MAX_PAYLOAD_LEN).unwrap().is_none());
    }

    #[test]
    fn partial_header_is_malformed() {
        let header = encode_request_header(ClientId::nil(), 1, 1100, 0);
        let mut cursor = Cursor::new(header[..10].to_vec());
        match read_request(&mut cursor, MAX_PAYLOAD_LEN) {
            Err(FrameError::Proto(ProtoError::MalformedHeader { expected, actual })) => {
                assert_eq!((expected, actual), (23, 10));
            }
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn oversized_payload_is_refused_before_reading() {
        let header = encode_request_header(ClientId::nil(), 1, 1100, u32::MAX);
        let mut cursor = Cursor::new(header.to_vec());
        match read_request(&mut cursor, 1024) {
            Err(FrameError::Proto(ProtoError::PayloadTooLarge { max, declared })) => {
                assert_eq!(max, 1024);
                assert_eq!(declared, u32::MAX as usize);
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn short_payload_is_an_io_error() {
        let mut wire = encode_request_header(ClientId::nil(), 1, 1100, 10).to_vec();
        wire.extend_from_slice(b"abc");
        let mut cursor = Cursor::new(wire);
        match read_request(&mut cursor, MAX_PAYLOAD_LEN) {
            Err(FrameError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn response_round_trips_through_stream() {
        let resp = Response::failure(1, ResponseCode::GeneralFailure);
        let mut wire = Vec::new();
        write_response(&mut wire, &resp).unwrap();
        assert_eq!(wire.len(), RESPONSE_HEADER_LEN);
        let got = read_response(&mut Cursor::new(wire), MAX_PAYLOAD_LEN).unwrap();
        assert_eq!(got, resp);
    }

    #[test]
    fn response_cut_short_is_malformed() {
        match read_response(&mut Cursor::new(vec![1u8, 0x34]), MAX_PAYLOAD_LEN) {
            Err(FrameError::Proto(ProtoError::MalformedHeader { actual: 2, .. })) => {}
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }
}
