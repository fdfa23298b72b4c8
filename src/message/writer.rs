//! Sequential encoder for message payloads.

use bytes::{BufMut, Bytes, BytesMut};

use super::{EncodeError, StringEncoding};
use crate::byte_order::{write_wire_u16, write_wire_u32, write_wire_u64};

/// Appends primitive values to a payload in wire order.
///
/// The writer produces a bare payload. It never writes a frame length; the
/// connection adds the 4-byte prefix when the payload is sent.
///
/// # Examples
///
/// ```
/// use packetlink::message::{MessageReader, MessageWriter};
///
/// let mut writer = MessageWriter::new();
/// writer.write_u32(0x1234_5678);
/// writer.write_string("hi")?;
///
/// let mut reader = MessageReader::new(writer.into_bytes());
/// assert_eq!(reader.read_u32()?, 0x1234_5678);
/// assert_eq!(reader.read_string()?, "hi");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MessageWriter {
    buf: BytesMut,
}

impl MessageWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty writer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn position(&self) -> usize { self.buf.len() }

    /// Rewind to the start, discarding everything written.
    pub fn reset(&mut self) { self.buf.clear(); }

    /// Write a boolean as a single `0` or `1` byte.
    pub fn write_bool(&mut self, value: bool) { self.buf.put_u8(u8::from(value)); }

    pub fn write_u8(&mut self, value: u8) { self.buf.put_u8(value); }

    pub fn write_i8(&mut self, value: i8) { self.buf.put_i8(value); }

    pub fn write_u16(&mut self, value: u16) { self.buf.put_slice(&write_wire_u16(value)); }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_slice(&write_wire_u16(value.cast_unsigned()));
    }

    pub fn write_u32(&mut self, value: u32) { self.buf.put_slice(&write_wire_u32(value)); }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_slice(&write_wire_u32(value.cast_unsigned()));
    }

    pub fn write_u64(&mut self, value: u64) { self.buf.put_slice(&write_wire_u64(value)); }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_slice(&write_wire_u64(value.cast_unsigned()));
    }

    /// Write an IEEE-754 single-precision float.
    pub fn write_f32(&mut self, value: f32) { self.write_u32(value.to_bits()); }

    /// Write an IEEE-754 double-precision float.
    pub fn write_f64(&mut self, value: f64) { self.write_u64(value.to_bits()); }

    /// Write raw bytes with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) { self.buf.put_slice(bytes); }

    /// Write a UTF-16LE string with its 16-bit byte-length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::StringTooLong`] if the encoded string exceeds
    /// `u16::MAX` bytes. Nothing is written in that case.
    pub fn write_string(&mut self, value: &str) -> Result<(), EncodeError> {
        self.write_string_with(value, StringEncoding::default())
    }

    /// Write a string in `encoding` with its 16-bit byte-length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::StringTooLong`] if the encoded string exceeds
    /// `u16::MAX` bytes. Nothing is written in that case.
    pub fn write_string_with(
        &mut self,
        value: &str,
        encoding: StringEncoding,
    ) -> Result<(), EncodeError> {
        let bytes = encoding.encode(value);
        let len = u16::try_from(bytes.len())
            .map_err(|_| EncodeError::StringTooLong { len: bytes.len() })?;
        self.write_u16(len);
        self.write_bytes(&bytes);
        Ok(())
    }

    /// Borrow the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.buf }

    /// Consume the writer and return the encoded payload.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.buf.freeze() }
}
