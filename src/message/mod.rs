//! Binary message codec for frame payloads.
//!
//! A payload is a flat sequence of primitive fields whose order is defined by
//! the application protocol. [`MessageWriter`] appends fields and
//! [`MessageReader`] reads them back in the same order.
//!
//! | Type | Encoding |
//! |------|----------|
//! | `bool` | 1 byte, `0` or `1` |
//! | `u8`/`i8` | 1 byte |
//! | `u16`/`i16` | 2 bytes little-endian |
//! | `u32`/`i32` | 4 bytes little-endian |
//! | `u64`/`i64` | 8 bytes little-endian |
//! | `f32` | 4 bytes little-endian IEEE-754 |
//! | `f64` | 8 bytes little-endian IEEE-754 |
//! | string | `u16` little-endian byte length, then the encoded bytes |
//!
//! Strings default to UTF-16LE; see [`StringEncoding`] for alternatives.

mod encoding;
mod error;
mod reader;
mod writer;

pub use encoding::StringEncoding;
pub use error::{DecodeError, EncodeError};
pub use reader::MessageReader;
pub use writer::MessageWriter;

#[cfg(test)]
mod tests;
