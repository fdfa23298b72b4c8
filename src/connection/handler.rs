//! Notifications raised by a connection.

use bytes::Bytes;
use tokio::sync::mpsc;

use super::{CloseReason, ConnectError};
use crate::frame::Frame;

/// Receives connection notifications.
///
/// Callbacks run on the connection's I/O tasks, never while internal locks
/// are held, so they may call back into the [`Connection`](super::Connection).
/// Slow callbacks delay the next read.
///
/// All methods default to doing nothing.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// The socket connected and the receive loop is about to start.
    fn on_connected(&self) {}

    /// A connection attempt failed. The connection is disconnected again.
    fn on_connection_failed(&self, _error: ConnectError) {}

    /// A complete frame arrived. It still carries its length header.
    fn on_frame_received(&self, _frame: Frame) {}

    /// A raw chunk was read. Fires after the frames it completed.
    fn on_data_received(&self, _chunk: Bytes) {}

    /// A frame of `_count` bytes, header included, was written.
    fn on_bytes_sent(&self, _count: usize) {}

    /// The connection closed. Fires once per connected or connecting period.
    fn on_closed(&self, _reason: CloseReason) {}
}

/// A connection notification, as delivered by [`ChannelHandler`].
#[derive(Debug)]
pub enum ConnectionEvent {
    /// See [`ConnectionHandler::on_connected`].
    Connected,
    /// See [`ConnectionHandler::on_connection_failed`].
    ConnectionFailed(ConnectError),
    /// See [`ConnectionHandler::on_frame_received`].
    FrameReceived(Frame),
    /// See [`ConnectionHandler::on_data_received`].
    DataReceived(Bytes),
    /// See [`ConnectionHandler::on_bytes_sent`].
    BytesSent(usize),
    /// See [`ConnectionHandler::on_closed`].
    Closed(CloseReason),
}

/// Forwards every notification into an unbounded channel.
///
/// Events are dropped silently once the receiver is gone.
#[derive(Clone, Debug)]
pub struct ChannelHandler {
    events: mpsc::UnboundedSender<ConnectionEvent>,
}

impl ChannelHandler {
    /// Wrap an existing sender.
    #[must_use]
    pub fn new(events: mpsc::UnboundedSender<ConnectionEvent>) -> Self { Self { events } }

    fn forward(&self, event: ConnectionEvent) { let _ = self.events.send(event); }
}

impl ConnectionHandler for ChannelHandler {
    fn on_connected(&self) { self.forward(ConnectionEvent::Connected); }

    fn on_connection_failed(&self, error: ConnectError) {
        self.forward(ConnectionEvent::ConnectionFailed(error));
    }

    fn on_frame_received(&self, frame: Frame) { self.forward(ConnectionEvent::FrameReceived(frame)); }

    fn on_data_received(&self, chunk: Bytes) { self.forward(ConnectionEvent::DataReceived(chunk)); }

    fn on_bytes_sent(&self, count: usize) { self.forward(ConnectionEvent::BytesSent(count)); }

    fn on_closed(&self, reason: CloseReason) { self.forward(ConnectionEvent::Closed(reason)); }
}

/// Create a [`ChannelHandler`] together with the receiving end of its
/// channel.
///
/// # Examples
///
/// ```
/// use packetlink::connection::{ConnectionHandler, event_channel};
///
/// let (handler, mut events) = event_channel();
/// handler.on_bytes_sent(7);
/// assert!(events.try_recv().is_ok());
/// ```
#[must_use]
pub fn event_channel() -> (ChannelHandler, mpsc::UnboundedReceiver<ConnectionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelHandler::new(tx), rx)
}
