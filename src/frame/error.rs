//! Error types for framing and reassembly.

use thiserror::Error;

/// Errors raised while reassembling frames from a byte stream.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// A length prefix declared more payload than the configured maximum.
    ///
    /// The reassembler discards its buffered bytes before returning this
    /// error; the stream cannot be resynchronised.
    #[error("frame exceeds max length: {size} > {max}")]
    FrameTooLarge {
        /// Payload length declared by the prefix.
        size: usize,
        /// Maximum payload length accepted.
        max: usize,
    },

    /// The ring buffer returned fewer bytes than a complete frame it reported
    /// as available. This indicates a bug, not bad input.
    #[error("frame length inconsistent: expected {expected} bytes, read {actual}")]
    LengthMismatch {
        /// Bytes the frame should occupy, header included.
        expected: usize,
        /// Bytes actually read.
        actual: usize,
    },
}

/// A payload too long for the 4-byte length prefix.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("payload of {size} bytes exceeds the {} byte frame limit", u32::MAX)]
pub struct PayloadTooLarge {
    /// Payload length in bytes.
    pub size: usize,
}
