//! Client connection with asynchronous notifications.
//!
//! A [`Connection`] moves through three states:
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!      ^                        |                  |
//!      +---- failure / close ---+---- close / EOF -+
//! ```
//!
//! Outcomes are reported through a [`ConnectionHandler`]. Each connect
//! attempt starts a new generation; completions belonging to an earlier
//! generation are dropped, so a late read or write result never reaches the
//! handler after `close`.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::{net::ToSocketAddrs, runtime::Handle, sync::mpsc};
use tokio_util::sync::CancellationToken;

use crate::{
    frame::{Frame, FrameReassembler},
    message::MessageWriter,
    metrics::{self, Direction},
};

mod config;
mod endpoint;
mod error;
mod handler;
mod socket_options;
mod task;

pub use config::{ConnectionConfig, DEFAULT_RECEIVE_BUFFER_SIZE};
pub use endpoint::{any, loopback, resolve_ipv4};
pub use error::{CloseReason, ConnectError, ConnectionError, ConnectionState};
pub use handler::{ChannelHandler, ConnectionEvent, ConnectionHandler, event_channel};
pub use socket_options::SocketOptions;

/// A framed TCP client connection.
///
/// All methods take `&self`; wrap the connection in an [`Arc`] to share it
/// between tasks. Dropping the connection closes it.
///
/// # Examples
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use packetlink::connection::{Connection, ConnectionConfig, ConnectionEvent, event_channel};
///
/// let (handler, mut events) = event_channel();
/// let connection = Connection::new(ConnectionConfig::default(), handler);
/// connection.connect("127.0.0.1:7000")?;
///
/// while let Some(event) = events.recv().await {
///     match event {
///         ConnectionEvent::Connected => connection.send(b"hello")?,
///         ConnectionEvent::FrameReceived(frame) => println!("{:?}", frame.payload()),
///         ConnectionEvent::Closed(_) | ConnectionEvent::ConnectionFailed(_) => break,
///         _ => {}
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct Connection {
    shared: Arc<Shared>,
}

struct Shared {
    config: ConnectionConfig,
    handler: Box<dyn ConnectionHandler>,
    runtime: Handle,
    slot: Mutex<Slot>,
}

struct Slot {
    state: ConnectionState,
    generation: u64,
    reassembler: FrameReassembler,
    outbound: Option<mpsc::UnboundedSender<Frame>>,
    cancel: CancellationToken,
    local_addr: Option<SocketAddr>,
    peer_addr: Option<SocketAddr>,
}

impl Connection {
    /// Create a disconnected connection bound to the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn new(config: ConnectionConfig, handler: impl ConnectionHandler) -> Self {
        Self::with_runtime(Handle::current(), config, handler)
    }

    /// Create a disconnected connection whose I/O tasks run on `runtime`.
    #[must_use]
    pub fn with_runtime(
        runtime: Handle,
        config: ConnectionConfig,
        handler: impl ConnectionHandler,
    ) -> Self {
        let reassembler = FrameReassembler::new(config.reassembly_capacity_value())
            .with_max_frame_length(config.max_frame_length_value());
        Self {
            shared: Arc::new(Shared {
                config,
                handler: Box::new(handler),
                runtime,
                slot: Mutex::new(Slot {
                    state: ConnectionState::Disconnected,
                    generation: 0,
                    reassembler,
                    outbound: None,
                    cancel: CancellationToken::new(),
                    local_addr: None,
                    peer_addr: None,
                }),
            }),
        }
    }

    /// Start connecting to `endpoint` and return immediately.
    ///
    /// The endpoint is resolved to its first IPv4 address. The outcome is
    /// reported through [`ConnectionHandler::on_connected`] or
    /// [`ConnectionHandler::on_connection_failed`]; after a failure the
    /// connection may be reused.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::InvalidOperation`] unless the connection is
    /// disconnected.
    pub fn connect<A>(&self, endpoint: A) -> Result<(), ConnectionError>
    where
        A: ToSocketAddrs + Send + 'static,
    {
        let (generation, cancel) = {
            let mut slot = self.shared.lock();
            if slot.state != ConnectionState::Disconnected {
                return Err(ConnectionError::InvalidOperation(slot.state));
            }
            slot.state = ConnectionState::Connecting;
            slot.generation += 1;
            slot.reassembler
                .reset_with_capacity(self.shared.config.reassembly_capacity_value());
            slot.cancel = CancellationToken::new();
            (slot.generation, slot.cancel.clone())
        };
        tracing::debug!(generation, "connecting");

        task::spawn_guarded(
            Arc::clone(&self.shared),
            generation,
            task::run(Arc::clone(&self.shared), endpoint, generation, cancel),
        );
        Ok(())
    }

    /// Queue `payload` as one frame.
    ///
    /// Frames are written in call order and never interleave, even when
    /// `send` is called from several tasks at once. Each completed write is
    /// reported through [`ConnectionHandler::on_bytes_sent`].
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::NotConnected`] unless the connection is
    /// connected, and [`ConnectionError::PayloadTooLarge`] if the payload
    /// exceeds the length prefix.
    pub fn send(&self, payload: impl AsRef<[u8]>) -> Result<(), ConnectionError> {
        let frame = Frame::from_payload(payload)?;
        let slot = self.shared.lock();
        match (slot.state, slot.outbound.as_ref()) {
            (ConnectionState::Connected, Some(outbound)) => outbound
                .send(frame)
                .map_err(|_| ConnectionError::NotConnected),
            _ => Err(ConnectionError::NotConnected),
        }
    }

    /// Queue the bytes written so far to `message` as one frame.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn send_message(&self, message: &MessageWriter) -> Result<(), ConnectionError> {
        self.send(message.as_bytes())
    }

    /// Close the connection.
    ///
    /// Cancels any pending connect, read, or write, discards partially
    /// received frames, and reports [`CloseReason::Requested`]. Closing a
    /// disconnected connection does nothing.
    pub fn close(&self) {
        let generation = self.shared.lock().generation;
        self.shared.close(generation, CloseReason::Requested);
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState { self.shared.lock().state }

    /// Whether the connection is established.
    #[must_use]
    pub fn is_connected(&self) -> bool { self.state() == ConnectionState::Connected }

    /// Local address of the established socket.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.shared.lock().local_addr }

    /// Remote address of the established socket.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> { self.shared.lock().peer_addr }
}

impl Drop for Connection {
    fn drop(&mut self) { self.close(); }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slot = self.shared.lock();
        f.debug_struct("Connection")
            .field("state", &slot.state)
            .field("generation", &slot.generation)
            .field("peer_addr", &slot.peer_addr)
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `generation` is still the live connection.
    fn is_current(&self, generation: u64) -> bool {
        let slot = self.lock();
        slot.generation == generation && slot.state != ConnectionState::Disconnected
    }

    /// Promote a pending attempt to connected. Returns `false` if the attempt
    /// was abandoned meanwhile.
    fn connected(
        &self,
        generation: u64,
        outbound: mpsc::UnboundedSender<Frame>,
        local_addr: Option<SocketAddr>,
        peer_addr: Option<SocketAddr>,
    ) -> bool {
        {
            let mut slot = self.lock();
            if slot.generation != generation || slot.state != ConnectionState::Connecting {
                return false;
            }
            slot.state = ConnectionState::Connected;
            slot.outbound = Some(outbound);
            slot.local_addr = local_addr;
            slot.peer_addr = peer_addr;
        }
        metrics::inc_connections();
        tracing::info!(generation, ?peer_addr, "connected");
        self.handler.on_connected();
        true
    }

    fn connect_failed(&self, generation: u64, error: ConnectError) {
        {
            let mut slot = self.lock();
            if slot.generation != generation || slot.state != ConnectionState::Connecting {
                return;
            }
            slot.state = ConnectionState::Disconnected;
            slot.cancel.cancel();
        }
        metrics::inc_errors();
        tracing::warn!(generation, error = %error, "connection attempt failed");
        self.handler.on_connection_failed(error);
    }

    /// Feed a received chunk through the reassembler and notify the handler.
    /// Returns `false` once the receive loop should stop.
    fn deliver(&self, generation: u64, chunk: bytes::Bytes) -> bool {
        let mut frames = Vec::new();
        let outcome = {
            let mut slot = self.lock();
            if slot.generation != generation || slot.state != ConnectionState::Connected {
                return false;
            }
            slot.reassembler.add_bytes(&chunk, |frame| frames.push(frame))
        };

        for frame in frames {
            // A handler may close (or reconnect) from inside a callback.
            if !self.is_current(generation) {
                return false;
            }
            metrics::inc_frames(Direction::Inbound);
            self.handler.on_frame_received(frame);
        }

        if !self.is_current(generation) {
            return false;
        }
        match outcome {
            Ok(_) => {
                self.handler.on_data_received(chunk);
                self.is_current(generation)
            }
            Err(err) => {
                tracing::error!(generation, error = %err, "discarding unframeable input");
                self.close(generation, CloseReason::Protocol(err));
                false
            }
        }
    }

    /// Report a finished write unless `generation` ended while it was in
    /// flight.
    fn bytes_sent(&self, generation: u64, count: usize) {
        if !self.is_current(generation) {
            return;
        }
        metrics::inc_frames(Direction::Outbound);
        self.handler.on_bytes_sent(count);
    }

    /// Tear down `generation` and report `reason`. Does nothing if that
    /// generation already ended, so each connection closes exactly once.
    fn close(&self, generation: u64, reason: CloseReason) {
        let was_connected = {
            let mut slot = self.lock();
            if slot.generation != generation || slot.state == ConnectionState::Disconnected {
                return;
            }
            let was_connected = slot.state == ConnectionState::Connected;
            slot.state = ConnectionState::Disconnected;
            slot.generation += 1;
            slot.cancel.cancel();
            slot.outbound = None;
            slot.reassembler.reset();
            slot.local_addr = None;
            slot.peer_addr = None;
            was_connected
        };
        if was_connected {
            metrics::dec_connections();
        }
        match &reason {
            CloseReason::Requested | CloseReason::PeerClosed => {
                tracing::info!(generation, %reason, "connection closed");
            }
            CloseReason::Transport(_) | CloseReason::Protocol(_) => {
                metrics::inc_errors();
                tracing::warn!(generation, %reason, "connection closed");
            }
        }
        self.handler.on_closed(reason);
    }
}
