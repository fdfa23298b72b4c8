//! Growable byte ring buffer with peek support.
//!
//! [`RingBuffer`] is the staging area for partially received frames. Bytes
//! are appended at the write cursor and consumed from the read cursor; when an
//! append would overflow, the storage grows to the next power of two and the
//! queued bytes are compacted to the front. The buffer never shrinks unless
//! [`RingBuffer::reset_with_capacity`] is called.

/// Smallest capacity a [`RingBuffer`] will allocate.
pub const MIN_CAPACITY: usize = 2;

/// Append/consume byte store with non-consuming reads.
///
/// # Examples
///
/// ```
/// use packetlink::ring_buffer::RingBuffer;
///
/// let mut buffer = RingBuffer::with_capacity(4);
/// buffer.write(b"hello");
/// assert_eq!(buffer.read(2, false), b"he");
/// assert_eq!(buffer.read(5, true), b"hello");
/// assert_eq!(buffer.available_to_read(), 0);
/// ```
#[derive(Clone)]
pub struct RingBuffer {
    storage: Vec<u8>,
    read_pos: usize,
    len: usize,
}

impl RingBuffer {
    /// Create a buffer able to hold `capacity` bytes before growing.
    ///
    /// Capacities below [`MIN_CAPACITY`] are raised to it.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity.max(MIN_CAPACITY)],
            read_pos: 0,
            len: 0,
        }
    }

    /// Current storage size in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize { self.storage.len() }

    /// Bytes queued and not yet consumed.
    #[must_use]
    pub fn available_to_read(&self) -> usize { self.len }

    /// Bytes that can be appended without growing.
    #[must_use]
    pub fn available_to_write(&self) -> usize { self.capacity() - self.len }

    /// Returns `true` when no bytes are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    fn write_pos(&self) -> usize { self.wrap(self.read_pos + self.len) }

    /// Fold an index in `0..2 * capacity` back into the storage.
    fn wrap(&self, index: usize) -> usize {
        if index >= self.capacity() {
            index - self.capacity()
        } else {
            index
        }
    }

    /// Append `data`, growing the storage when it does not fit.
    pub fn write(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        if data.len() > self.available_to_write() {
            self.grow((self.len + data.len()).next_power_of_two());
        }

        let start = self.write_pos();
        let right = (self.capacity() - start).min(data.len());
        let (head, tail) = data.split_at(right);
        self.storage[start..start + right].copy_from_slice(head);
        self.storage[..tail.len()].copy_from_slice(tail);
        self.len += data.len();
    }

    /// Copy up to `dst.len()` queued bytes into `dst`.
    ///
    /// When `consume` is `false` the read cursor stays put. Returns the number
    /// of bytes copied, which is less than `dst.len()` when fewer bytes are
    /// queued.
    pub fn read_into(&mut self, dst: &mut [u8], consume: bool) -> usize {
        let count = self.peek_into(dst);
        if consume {
            self.advance(count);
        }
        count
    }

    /// Return up to `count` queued bytes, consuming them when `consume` is set.
    ///
    /// Callers must compare the returned length against `count`.
    pub fn read(&mut self, count: usize, consume: bool) -> Vec<u8> {
        let mut out = vec![0; count.min(self.len)];
        self.read_into(&mut out, consume);
        out
    }

    /// Skip up to `count` queued bytes without copying them.
    ///
    /// Returns the number of bytes skipped.
    pub fn consume(&mut self, count: usize) -> usize {
        let count = count.min(self.len);
        self.advance(count);
        count
    }

    /// Drop every queued byte, keeping the current storage.
    pub fn reset(&mut self) {
        self.read_pos = 0;
        self.len = 0;
    }

    /// Drop every queued byte and resize the storage to `capacity`.
    pub fn reset_with_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(MIN_CAPACITY);
        if capacity != self.capacity() {
            self.storage = vec![0; capacity];
        }
        self.reset();
    }

    fn peek_into(&self, dst: &mut [u8]) -> usize {
        let count = dst.len().min(self.len);
        let right = (self.capacity() - self.read_pos).min(count);
        dst[..right].copy_from_slice(&self.storage[self.read_pos..self.read_pos + right]);
        dst[right..count].copy_from_slice(&self.storage[..count - right]);
        count
    }

    fn advance(&mut self, count: usize) {
        self.read_pos = self.wrap(self.read_pos + count);
        self.len -= count;
        if self.len == 0 {
            self.read_pos = 0;
        }
    }

    fn grow(&mut self, capacity: usize) {
        let mut storage = vec![0; capacity.max(MIN_CAPACITY)];
        let queued = self.peek_into(&mut storage);
        debug_assert_eq!(queued, self.len, "grow must keep every queued byte");
        self.storage = storage;
        self.read_pos = 0;
    }
}

impl Default for RingBuffer {
    fn default() -> Self { Self::with_capacity(4096) }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("read_pos", &self.read_pos)
            .field("len", &self.len)
            .finish()
    }
}
