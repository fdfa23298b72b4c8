//! Tunables for a [`FrameServer`](super::FrameServer).

use super::BackoffConfig;
use crate::{connection::DEFAULT_RECEIVE_BUFFER_SIZE, frame::MAX_FRAME_LENGTH};

/// Default listen backlog.
pub const DEFAULT_BACKLOG: u32 = 1024;

/// Settings shared by every client accepted by a server.
///
/// # Examples
///
/// ```
/// use packetlink::server::ServerConfig;
///
/// let config = ServerConfig::default().nodelay(true).max_frame_length(Some(1024));
/// assert_eq!(config.max_frame_length_value(), Some(1024));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    receive_buffer_size: usize,
    max_frame_length: Option<usize>,
    nodelay: Option<bool>,
    backlog: u32,
    backoff: BackoffConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            receive_buffer_size: DEFAULT_RECEIVE_BUFFER_SIZE,
            max_frame_length: Some(MAX_FRAME_LENGTH),
            nodelay: None,
            backlog: DEFAULT_BACKLOG,
            backoff: BackoffConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Bytes requested from each client socket per read. Clamped to at
    /// least one.
    #[must_use]
    pub fn receive_buffer_size(mut self, size: usize) -> Self {
        self.receive_buffer_size = size.max(1);
        self
    }

    /// Largest payload accepted from a client; `None` disables the check.
    #[must_use]
    pub fn max_frame_length(mut self, max: Option<usize>) -> Self {
        self.max_frame_length = max;
        self
    }

    /// Set `TCP_NODELAY` on every accepted socket.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = Some(enabled);
        self
    }

    /// Listen backlog used by [`FrameServer::bind`](super::FrameServer::bind).
    #[must_use]
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.backlog = backlog;
        self
    }

    /// Retry timing after failed accepts.
    #[must_use]
    pub fn accept_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Configured receive buffer size.
    #[must_use]
    pub fn receive_buffer_size_value(&self) -> usize { self.receive_buffer_size }

    /// Initial reassembly capacity for each client.
    #[must_use]
    pub fn reassembly_capacity_value(&self) -> usize { self.receive_buffer_size.saturating_mul(4) }

    /// Configured maximum payload length.
    #[must_use]
    pub fn max_frame_length_value(&self) -> Option<usize> { self.max_frame_length }

    /// Configured `TCP_NODELAY` setting.
    #[must_use]
    pub fn nodelay_value(&self) -> Option<bool> { self.nodelay }

    /// Configured listen backlog.
    #[must_use]
    pub fn backlog_value(&self) -> u32 { self.backlog }

    /// Configured accept back-off.
    #[must_use]
    pub fn accept_backoff_value(&self) -> BackoffConfig { self.backoff }
}
