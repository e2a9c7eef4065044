use std::str;

use super::{MAX_NAME_LEN, NAME_FIELD_LEN, NAME_FILLER, NAME_TERMINATOR, ProtoError};

/// Lays `name` out as a fixed-width field: bytes, terminator, filler.
pub fn encode_name(name: &str) -> Result<Vec<u8>, ProtoError> {
    let bytes = name.as_bytes();
    if bytes.len() > MAX_NAME_LEN {
        return Err(ProtoError::NameTooLong {
            max: MAX_NAME_LEN,
            actual: bytes.len(),
        });
    }
    let mut field = Vec::with_capacity(NAME_FIELD_LEN);
    field.extend_from_slice(bytes);
    field.push(NAME_TERMINATOR);
    field.resize(NAME_FIELD_LEN, NAME_FILLER);
    Ok(field)
}

/// Reads a name from a field of at most `NAME_FIELD_LEN` bytes.
///
/// Stops at the first terminator or at the field width. Bytes after the
/// terminator are never inspected, so any filler decodes the same.
pub fn decode_name(field: &[u8]) -> Result<String, ProtoError> {
    let window = &field[..field.len().min(NAME_FIELD_LEN)];
    let end = window
        .iter()
        .position(|&b| b == NAME_TERMINATOR)
        .unwrap_or(window.len());
    str::from_utf8(&window[..end])
        .map(str::to_owned)
        .map_err(|_| ProtoError::InvalidEncoding)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn field_is_name_terminator_then_filler() {
        let field = encode_name("alice").unwrap();
        assert_eq!(field.len(), NAME_FIELD_LEN);
        assert_eq!(&field[..5], b"alice");
        assert!(field[5..].iter().all(|&b| b == 0));
    }

    #[test]
    fn names_survive_the_field() {
        let longest = "x".repeat(MAX_NAME_LEN);
        for name in ["", "a", "alice", "Zoë 名前", longest.as_str()] {
            let field = encode_name(name).unwrap();
            assert_eq!(decode_name(&field).unwrap(), name);
        }
    }

    #[test]
    fn name_filling_the_whole_field_is_too_long() {
        let name = "y".repeat(NAME_FIELD_LEN);
        assert_eq!(
            encode_name(&name),
            Err(ProtoError::NameTooLong {
                max: MAX_NAME_LEN,
                actual: NAME_FIELD_LEN
            })
        );
    }

    #[test]
    fn ascii_zero_filler_decodes_identically() {
        let mut field = b"alice\0".to_vec();
        field.resize(NAME_FIELD_LEN, b'0');
        assert_eq!(decode_name(&field).unwrap(), "alice");
    }

    #[test]
    fn garbage_after_terminator_is_ignored() {
        let field = [b'b', b'o', b'b', 0x00, 0xff, 0xfe];
        assert_eq!(decode_name(&field).unwrap(), "bob");
    }

    #[test]
    fn unterminated_short_field_uses_all_bytes() {
        assert_eq!(decode_name(b"carol").unwrap(), "carol");
    }

    #[test]
    fn decoding_stops_at_field_width() {
        let mut field = "z".repeat(NAME_FIELD_LEN).into_bytes();
        field.extend_from_slice(b"overflow");
        assert_eq!(decode_name(&field).unwrap().len(), NAME_FIELD_LEN);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(
            decode_name(&[0xc3, 0x28, 0x00]),
            Err(ProtoError::InvalidEncoding)
        );
    }
}
