//! Length-prefixed frames and stream reassembly.
//!
//! On the wire every frame is a 4-byte little-endian payload length followed
//! by exactly that many payload bytes:
//!
//! ```text
//! Frame := LengthPrefix(u32 LE) || Payload(LengthPrefix bytes)
//! ```
//!
//! A [`Frame`] always carries its header. Readers built with
//! [`crate::message::MessageReader::from_frame`] skip that header before the
//! first field.

use bytes::{BufMut, Bytes, BytesMut};

use crate::byte_order::{read_wire_u32, write_wire_u32};

mod error;
pub mod reassembler;

pub use error::{PayloadTooLarge, ReassemblyError};
pub use reassembler::FrameReassembler;

/// Length prefix size in bytes.
pub const LENGTH_HEADER_SIZE: usize = 4;

/// Default ceiling on payload length (16 MiB) for connections and servers.
pub const MAX_FRAME_LENGTH: usize = 16 * 1024 * 1024;

/// One complete wire frame, header included.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame(Bytes);

impl Frame {
    /// Build a frame by prefixing `payload` with its length.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadTooLarge`] if the payload is longer than `u32::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::frame::Frame;
    ///
    /// let frame = Frame::from_payload(b"abc")?;
    /// assert_eq!(frame.as_ref(), &[3, 0, 0, 0, b'a', b'b', b'c']);
    /// assert_eq!(frame.payload(), b"abc");
    /// # Ok::<(), packetlink::frame::PayloadTooLarge>(())
    /// ```
    pub fn from_payload(payload: impl AsRef<[u8]>) -> Result<Self, PayloadTooLarge> {
        let payload = payload.as_ref();
        let len = u32::try_from(payload.len()).map_err(|_| PayloadTooLarge {
            size: payload.len(),
        })?;
        let mut buf = BytesMut::with_capacity(LENGTH_HEADER_SIZE + payload.len());
        buf.put_slice(&write_wire_u32(len));
        buf.put_slice(payload);
        Ok(Self(buf.freeze()))
    }

    /// Wrap bytes already known to hold exactly one frame.
    pub(crate) fn from_wire(bytes: Bytes) -> Self {
        debug_assert!(bytes.len() >= LENGTH_HEADER_SIZE, "frame shorter than its header");
        Self(bytes)
    }

    /// Payload length declared by the header.
    #[must_use]
    pub fn payload_len(&self) -> usize { self.0.len() - LENGTH_HEADER_SIZE }

    /// Total length on the wire, header included.
    #[must_use]
    pub fn wire_len(&self) -> usize { self.0.len() }

    /// Payload bytes, header excluded.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.0[LENGTH_HEADER_SIZE..] }

    /// Payload as owned [`Bytes`] without copying.
    #[must_use]
    pub fn payload_bytes(&self) -> Bytes { self.0.slice(LENGTH_HEADER_SIZE..) }

    /// Raw frame bytes, header included.
    #[must_use]
    pub fn as_bytes(&self) -> &Bytes { &self.0 }

    /// Consume the frame and return its raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> Bytes { self.0 }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] { &self.0 }
}

/// Read the payload length from a complete header.
#[must_use]
pub fn read_length_prefix(header: [u8; LENGTH_HEADER_SIZE]) -> usize {
    usize::try_from(read_wire_u32(header)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests;
