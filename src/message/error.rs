//! Error types for the message codec.

use thiserror::Error;

use super::StringEncoding;

/// Errors raised while decoding message fields.
///
/// Decode failures are local to the decode call; they never affect the
/// connection the payload arrived on.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// A read asked for more bytes than the message holds.
    #[error("end of stream: needed {needed} bytes, {remaining} remaining")]
    EndOfStream {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left after the current position.
        remaining: usize,
    },

    /// String bytes were not valid for the requested encoding.
    #[error("invalid {encoding} string data")]
    InvalidString {
        /// Encoding the bytes were decoded with.
        encoding: StringEncoding,
    },
}

/// Errors raised while encoding message fields.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// The encoded string does not fit the 16-bit length field.
    #[error("encoded string is {len} bytes, limit is {}", u16::MAX)]
    StringTooLong {
        /// Encoded length in bytes.
        len: usize,
    },
}
