//! Wire protocol.
//!
//! Request:
//!   [client_id: 16B][version: u8][op_code: u16 LE][payload_size: u32 LE][payload...]
//! Response:
//!   [version: u8][code: u16 LE][payload_size: u32 LE][payload...]
//!
//! Registration payload is the name field: name bytes, one NUL, filler up to
//! `NAME_FIELD_LEN`.
mod client_id;
mod errors;
mod framing;
mod header;
mod message;
mod name_field;
mod op_code;
mod response_code;

pub use client_id::ClientId;
pub use errors::{FrameError, ProtoError};
pub use framing::{read_request, read_response, write_request, write_response};
pub use header::{
    RequestHeader, ResponseHeader, decode_request_header, decode_response_header,
    encode_request_header, encode_response_header,
};
pub use message::{Request, Response};
pub use name_field::{decode_name, encode_name};
pub use op_code::OpCode;
pub use response_code::ResponseCode;

/// Protocol version the server stamps on every response.
pub const SERVER_VERSION: u8 = 1;

pub const REQUEST_HEADER_LEN: usize = 23;
pub const RESPONSE_HEADER_LEN: usize = 7;

/// Bytes reserved for a name on the wire, terminator and filler included.
pub const NAME_FIELD_LEN: usize = 255;
/// Longest name that still leaves room for the terminator.
pub const MAX_NAME_LEN: usize = NAME_FIELD_LEN - 1;
pub const NAME_TERMINATOR: u8 = 0x00;
pub const NAME_FILLER: u8 = 0x00;

/// Default ceiling for a declared payload size (to avoid OOM).
pub const MAX_PAYLOAD_LEN: usize = 1_048_576; // 1 MiB
