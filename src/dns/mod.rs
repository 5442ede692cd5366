//! DNS wire-message codec.
//!
//! Parses the parts of a DNS message the resolver needs (header, the single
//! question, the first authority record) and rewrites header flags in place.
//! Nothing here allocates a full record model: messages stay as raw bytes.

mod message;
mod name;
mod rewrite;

#[cfg(test)]
pub(crate) mod fixtures;

pub use message::{DnsMessage, Header, Question};
pub use name::{decode_name, encode_name};
pub use rewrite::{build_blocked_response, finalize_upstream_response, trim_padding};

use thiserror::Error;

/// Length of the fixed DNS header.
pub const HEADER_LEN: usize = 12;

/// Upper bound on labels plus pointer hops walked while decoding one name.
///
/// A 255-octet name has at most 127 labels, so this leaves room for the
/// terminator and any number of pointer hops a legal name can need.
pub const DEFAULT_NAME_BUDGET: usize = 255;

/// Byte used to pre-fill oversized receive buffers.
pub const SENTINEL: u8 = 0xFF;

/// Header flag bits, addressed within the 16-bit flags word (bytes 2..4).
pub const FLAG_QR: u16 = 1 << 15;
pub const MASK_OPCODE: u16 = 0x7800;
pub const FLAG_AA: u16 = 1 << 10;
pub const FLAG_TC: u16 = 1 << 9;
pub const FLAG_RD: u16 = 1 << 8;
pub const FLAG_RA: u16 = 1 << 7;
pub const MASK_Z: u16 = 0x0070;
pub const MASK_RCODE: u16 = 0x000F;

/// Response codes.
pub const RCODE_NOERROR: u8 = 0;
pub const RCODE_NXDOMAIN: u8 = 3;

/// Code written into locally refused (blocklisted) responses.
///
/// The sinkhole calls this REFUSED, but on the wire it is the value 3,
/// which standard clients read as NXDOMAIN.
pub const RCODE_BLOCKED: u8 = RCODE_NXDOMAIN;

/// Errors produced while decoding a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message truncated")]
    Truncated,

    #[error("compression pointer loop or name budget exceeded")]
    PointerLoop,

    #[error("reserved label type 0x{0:02x}")]
    BadLabel(u8),

    #[error("name longer than 255 octets")]
    NameTooLong,

    #[error("label longer than 63 octets")]
    LabelTooLong,

    #[error("empty label inside a name")]
    EmptyLabel,

    #[error("unsupported question count {0}, exactly one expected")]
    UnsupportedQuestionCount(u16),

    #[error("expected a query, got a response")]
    NotAQuery,

    #[error("query has no decodable question (rcode {0})")]
    MissingQuestion(u8),
}

/// Read the 16-bit flags word of a message.
pub(crate) fn read_flags(buf: &[u8]) -> Result<u16, DecodeError> {
    read_u16(buf, 2)
}

/// Read a big-endian u16 at `pos`, failing if it does not fit.
pub(crate) fn read_u16(buf: &[u8], pos: usize) -> Result<u16, DecodeError> {
    match buf.get(pos..pos + 2) {
        Some(bytes) => Ok(u16::from_be_bytes([bytes[0], bytes[1]])),
        None => Err(DecodeError::Truncated),
    }
}
