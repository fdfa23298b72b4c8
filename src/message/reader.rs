//! Sequential decoder for message payloads.

use bytes::Bytes;

use super::{DecodeError, StringEncoding};
use crate::{
    byte_order::{read_wire_u16, read_wire_u32, read_wire_u64},
    frame::{Frame, LENGTH_HEADER_SIZE},
};

/// Reads primitive values from a payload in the order they were written.
///
/// Every read either returns a value and advances the cursor, or fails with
/// [`DecodeError::EndOfStream`] and leaves the cursor unchanged.
#[derive(Clone, Debug)]
pub struct MessageReader {
    data: Bytes,
    position: usize,
}

impl MessageReader {
    /// Create a reader over a bare payload (no length prefix).
    #[must_use]
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            data: payload.into(),
            position: 0,
        }
    }

    /// Create a reader over a complete frame, skipping its length prefix.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if `frame` is shorter than the
    /// length prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::{frame::Frame, message::MessageReader};
    ///
    /// let frame = Frame::from_payload(&[7u8][..])?;
    /// let mut reader = MessageReader::from_frame(&frame)?;
    /// assert_eq!(reader.read_u8()?, 7);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_frame(frame: &Frame) -> Result<Self, DecodeError> {
        let mut reader = Self::new(frame.as_bytes().clone());
        reader.take(LENGTH_HEADER_SIZE)?;
        Ok(reader)
    }

    /// Bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize { self.position }

    /// Bytes left to read.
    #[must_use]
    pub fn remaining(&self) -> usize { self.data.len() - self.position }

    fn take(&mut self, count: usize) -> Result<&[u8], DecodeError> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(DecodeError::EndOfStream {
                needed: count,
                remaining,
            });
        }
        let start = self.position;
        self.position += count;
        Ok(&self.data[start..self.position])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a boolean; any nonzero byte is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if no byte remains.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> { Ok(self.read_u8()? != 0) }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if no byte remains.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.take_array::<1>()?;
        Ok(byte)
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if no byte remains.
    pub fn read_i8(&mut self) -> Result<i8, DecodeError> { Ok(self.read_u8()?.cast_signed()) }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 2 bytes remain.
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(read_wire_u16(self.take_array()?))
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 2 bytes remain.
    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        Ok(self.read_u16()?.cast_signed())
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(read_wire_u32(self.take_array()?))
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 4 bytes remain.
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.read_u32()?.cast_signed())
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(read_wire_u64(self.take_array()?))
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 8 bytes remain.
    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(self.read_u64()?.cast_signed())
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 4 bytes remain.
    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than 8 bytes remain.
    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read exactly `count` raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if fewer than `count` bytes remain.
    pub fn read_bytes(&mut self, count: usize) -> Result<Bytes, DecodeError> {
        let start = self.position;
        self.take(count)?;
        Ok(self.data.slice(start..self.position))
    }

    /// Read a UTF-16LE string written by [`super::MessageWriter::write_string`].
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if the length prefix or the string
    /// bytes are truncated, or [`DecodeError::InvalidString`] if the bytes are
    /// not valid UTF-16LE.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        self.read_string_with(StringEncoding::default())
    }

    /// Read a string encoded with `encoding`.
    ///
    /// On failure the cursor is restored to where the string began.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::EndOfStream`] if the length prefix or the string
    /// bytes are truncated, or [`DecodeError::InvalidString`] if the bytes are
    /// not valid for `encoding`.
    pub fn read_string_with(&mut self, encoding: StringEncoding) -> Result<String, DecodeError> {
        let start = self.position;
        let result = self
            .read_u16()
            .and_then(|len| self.take(usize::from(len)).and_then(|b| encoding.decode(b)));
        if result.is_err() {
            self.position = start;
        }
        result
    }
}
