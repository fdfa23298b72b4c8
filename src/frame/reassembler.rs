//! Turns an unbounded stream of byte chunks into complete frames.

use bytes::BytesMut;

use super::{Frame, LENGTH_HEADER_SIZE, ReassemblyError, read_length_prefix};
use crate::ring_buffer::RingBuffer;

/// Accumulates raw bytes and emits each frame once all of it has arrived.
///
/// Chunk boundaries carry no meaning: a frame may be split anywhere,
/// including inside its length prefix. Frames are emitted in the order their
/// bytes were added. The reassembler is not synchronised; a connection keeps
/// a single read in flight so only one task ever feeds it.
///
/// # Examples
///
/// ```
/// use packetlink::frame::FrameReassembler;
///
/// let mut reassembler = FrameReassembler::new(64);
/// let mut frames = Vec::new();
///
/// reassembler.add_bytes(&[2, 0], |f| frames.push(f))?;
/// reassembler.add_bytes(&[0, 0, b'o'], |f| frames.push(f))?;
/// assert!(frames.is_empty());
///
/// reassembler.add_bytes(&[b'k'], |f| frames.push(f))?;
/// assert_eq!(frames[0].payload(), b"ok");
/// # Ok::<(), packetlink::frame::ReassemblyError>(())
/// ```
#[derive(Debug)]
pub struct FrameReassembler {
    buffer: RingBuffer,
    max_frame_length: Option<usize>,
}

impl FrameReassembler {
    /// Create a reassembler whose buffer starts at `initial_capacity` bytes.
    ///
    /// No maximum frame length is enforced until
    /// [`with_max_frame_length`](Self::with_max_frame_length) sets one.
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            buffer: RingBuffer::with_capacity(initial_capacity),
            max_frame_length: None,
        }
    }

    /// Reject frames whose declared payload exceeds `max` bytes.
    #[must_use]
    pub fn with_max_frame_length(mut self, max: Option<usize>) -> Self {
        self.max_frame_length = max;
        self
    }

    /// Maximum payload length accepted, if any.
    #[must_use]
    pub fn max_frame_length(&self) -> Option<usize> { self.max_frame_length }

    /// Bytes held for frames that are not complete yet.
    #[must_use]
    pub fn buffered_len(&self) -> usize { self.buffer.available_to_read() }

    /// Append `chunk` and invoke `on_frame` for every frame it completes.
    ///
    /// Each emitted frame holds its header and payload verbatim. A trailing
    /// partial frame stays buffered for the next call. Returns the number of
    /// frames emitted.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::FrameTooLarge`] when a length prefix exceeds
    /// the configured maximum, and [`ReassemblyError::LengthMismatch`] if the
    /// buffer fails to produce a frame it reported as complete. Frames
    /// completed before the error have already been passed to `on_frame`.
    pub fn add_bytes<F>(&mut self, chunk: &[u8], mut on_frame: F) -> Result<usize, ReassemblyError>
    where
        F: FnMut(Frame),
    {
        self.buffer.write(chunk);

        let mut completed = 0;
        while self.buffer.available_to_read() >= LENGTH_HEADER_SIZE {
            let mut header = [0u8; LENGTH_HEADER_SIZE];
            self.buffer.read_into(&mut header, false);
            let payload_len = read_length_prefix(header);

            if let Some(max) = self.max_frame_length
                && payload_len > max
            {
                self.buffer.reset();
                return Err(ReassemblyError::FrameTooLarge {
                    size: payload_len,
                    max,
                });
            }

            let frame_len = LENGTH_HEADER_SIZE.saturating_add(payload_len);
            if self.buffer.available_to_read() < frame_len {
                break;
            }

            let mut bytes = BytesMut::zeroed(frame_len);
            let read = self.buffer.read_into(&mut bytes, true);
            if read != frame_len {
                return Err(ReassemblyError::LengthMismatch {
                    expected: frame_len,
                    actual: read,
                });
            }

            tracing::trace!(payload_len, "frame completed");
            on_frame(Frame::from_wire(bytes.freeze()));
            completed += 1;
        }
        Ok(completed)
    }

    /// Append `chunk` and collect the completed frames.
    ///
    /// # Errors
    ///
    /// See [`add_bytes`](Self::add_bytes).
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, ReassemblyError> {
        let mut frames = Vec::new();
        self.add_bytes(chunk, |frame| frames.push(frame))?;
        Ok(frames)
    }

    /// Discard any partially received frame.
    pub fn reset(&mut self) { self.buffer.reset(); }

    /// Discard any partially received frame and resize the buffer.
    pub fn reset_with_capacity(&mut self, capacity: usize) {
        self.buffer.reset_with_capacity(capacity);
    }
}

impl Default for FrameReassembler {
    fn default() -> Self { Self::new(4096) }
}
