use std::fmt;
use std::str::FromStr;

use uuid::{Builder, Uuid};

use super::ProtoError;

/// Identifier issued to a registered client.
///
/// One value, two serializations:
/// - text: canonical hyphenated UUID, used in the identity tables;
/// - wire: 16 bytes with the first three UUID fields little-endian
///   (`bytes_le` layout), used in request headers and registration responses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClientId(Uuid);

impl ClientId {
    pub const WIRE_LEN: usize = 16;

    /// All-zero identifier; what a client sends before it has registered.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// Time-ordered random identifier: 48-bit unix milliseconds followed by
    /// random bits (UUIDv7 layout), so ids sort by issue time.
    pub fn time_ordered(unix_millis: u64, random: &[u8; 10]) -> Self {
        Self(Builder::from_unix_timestamp_millis(unix_millis, random).into_uuid())
    }

    pub fn from_wire_bytes(bytes: [u8; Self::WIRE_LEN]) -> Self {
        Self(Uuid::from_bytes_le(bytes))
    }

    pub fn to_wire_bytes(&self) -> [u8; Self::WIRE_LEN] {
        self.0.to_bytes_le()
    }

    /// Reads the wire form from the front of `bytes`, if long enough.
    pub fn from_wire_slice(bytes: &[u8]) -> Option<Self> {
        let head: [u8; Self::WIRE_LEN] = bytes.get(..Self::WIRE_LEN)?.try_into().ok()?;
        Some(Self::from_wire_bytes(head))
    }

    pub fn to_text(&self) -> String {
        self.0.hyphenated().to_string()
    }

    pub fn parse_text(s: &str) -> Result<Self, ProtoError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ProtoError::InvalidIdentifier(s.to_owned()))
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ClientId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for ClientId {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_text(s)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0.hyphenated())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn wire_form_swaps_leading_fields() {
        let id = ClientId::parse_text("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        assert_eq!(
            id.to_wire_bytes(),
            [
                0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff
            ]
        );
        assert_eq!(ClientId::from_wire_bytes(id.to_wire_bytes()), id);
    }

    #[test]
    fn text_and_wire_forms_describe_the_same_value() {
        let id = ClientId::time_ordered(1_700_000_000_000, &[7u8; 10]);
        let from_text: ClientId = id.to_text().parse().unwrap();
        let from_wire = ClientId::from_wire_slice(&id.to_wire_bytes()).unwrap();
        assert_eq!(from_text, id);
        assert_eq!(from_wire, id);
    }

    #[test]
    fn time_ordered_ids_are_v7_and_sort_by_time() {
        let earlier = ClientId::time_ordered(1_000, &[0xff; 10]);
        let later = ClientId::time_ordered(2_000, &[0x00; 10]);
        assert_eq!(earlier.as_uuid().get_version_num(), 7);
        assert!(earlier < later);
    }

    #[test]
    fn short_wire_slice_is_rejected() {
        assert!(ClientId::from_wire_slice(&[0u8; 15]).is_none());
    }

    #[test]
    fn garbage_text_is_rejected() {
        match ClientId::parse_text("not-a-uuid") {
            Err(ProtoError::InvalidIdentifier(raw)) => assert_eq!(raw, "not-a-uuid"),
            other => panic!("expected InvalidIdentifier, got {other:?}"),
        }
    }

    #[test]
    fn nil_is_nil() {
        assert!(ClientId::nil().is_nil());
        assert_eq!(ClientId::default(), ClientId::nil());
    }
}
