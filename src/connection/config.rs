//! Tunables for a client connection.

use std::time::Duration;

use super::SocketOptions;
use crate::frame::MAX_FRAME_LENGTH;

/// Default size of each receive buffer.
pub const DEFAULT_RECEIVE_BUFFER_SIZE: usize = 8192;

/// Settings for a [`Connection`](super::Connection).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use packetlink::connection::ConnectionConfig;
///
/// let config = ConnectionConfig::default()
///     .receive_buffer_size(1024)
///     .connect_timeout(Some(Duration::from_secs(2)));
/// assert_eq!(config.receive_buffer_size_value(), 1024);
/// assert_eq!(config.reassembly_capacity_value(), 4096);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    receive_buffer_size: usize,
    reassembly_capacity: Option<usize>,
    max_frame_length: Option<usize>,
    connect_timeout: Option<Duration>,
    socket_options: SocketOptions,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            reassembly_capacity: None,
            max_frame_length: Some(MAX_FRAME_LENGTH),
            connect_timeout: None,
            socket_options: SocketOptions::default(),
        }
    }
}

impl ConnectionConfig {
    /// Bytes requested from the socket per read. Clamped to at least one.
    #[must_use]
    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.receive_buffer_size = size.max(1);
        self
    }

    /// Initial capacity of the reassembly buffer.
    ///
    /// Defaults to four receive buffers.
    #[must_use]
    pub fn reassembly_capacity(mut self, capacity: usize) -> Self {
        self.reassembly_capacity = Some(capacity);
        self
    }

    /// Largest payload accepted from the peer; `None` disables the check.
    #[must_use]
    pub fn max_frame_length(mut self, max: Option<usize>) -> Self {
        self.max_frame_length = max;
        self
    }

    /// Give up on a connection attempt after `timeout`.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Options applied to the socket before connecting.
    #[must_use]
    pub fn socket_options(mut self, options: SocketOptions) -> Self {
        self.socket_options = options;
        self
    }

    /// Configured receive buffer size.
    #[must_use]
    pub fn receive_buffer_size_value(&self) -> usize { self.receive_buffer_size }

    /// Effective initial reassembly capacity.
    #[must_use]
    pub fn reassembly_capacity_value(&self) -> usize {
        self.reassembly_capacity
            .unwrap_or_else(|| self.receive_buffer_size.saturating_mul(4))
    }

    /// Configured maximum payload length.
    #[must_use]
    pub fn max_frame_length_value(&self) -> Option<usize> { self.max_frame_length }

    /// Configured connect timeout.
    #[must_use]
    pub fn connect_timeout_value(&self) -> Option<Duration> { self.connect_timeout }

    /// Configured socket options.
    #[must_use]
    pub fn socket_options_value(&self) -> &SocketOptions { &self.socket_options }
}
