//! Multi-client framed TCP server.
//!
//! [`FrameServer`] accepts IPv4 clients, reassembles each client's byte
//! stream into frames, and reports everything that happens as a
//! [`ServerEvent`] on a single channel. A [`ServerHandle`] sends frames to
//! one or all clients and disconnects them.

use std::{
    fmt,
    net::{SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
};

use bytes::Bytes;
use tokio::net::{TcpListener, TcpSocket};

use crate::{
    connection::CloseReason,
    frame::{Frame, PayloadTooLarge},
    message::MessageWriter,
};

mod config;
mod connection;
mod error;
mod registry;
mod runtime;

pub use config::{DEFAULT_BACKLOG, ServerConfig};
pub use error::{SendError, ServerError};
pub use runtime::BackoffConfig;
use registry::ServerShared;

/// Identifies one accepted client for the lifetime of a server.
///
/// Ids are assigned in accept order starting at 1 and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Numeric value of the id.
    #[must_use]
    pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// Something that happened on a server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerEvent {
    /// A client connected.
    ClientAccepted {
        /// Id assigned to the client.
        client: ClientId,
        /// Remote address of the client.
        peer: SocketAddr,
    },
    /// A complete frame arrived from a client. It still carries its header.
    FrameReceived {
        /// Sending client.
        client: ClientId,
        /// The frame.
        frame: Frame,
    },
    /// A raw chunk was read from a client, after the frames it completed.
    DataReceived {
        /// Sending client.
        client: ClientId,
        /// Bytes as read from the socket.
        chunk: Bytes,
    },
    /// A frame was written to a client.
    DataSent {
        /// Receiving client.
        client: ClientId,
        /// Bytes written, header included.
        bytes: usize,
    },
    /// A client is gone. Reported once per client.
    ClientDisconnected {
        /// The departed client.
        client: ClientId,
        /// Why it left.
        reason: CloseReason,
    },
}

/// A bound listener waiting to be started.
#[derive(Debug)]
pub struct FrameServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    config: ServerConfig,
}

impl FrameServer {
    /// Bind a listener on `addr`.
    ///
    /// Use [`any`](crate::connection::any) to listen on all interfaces and
    /// [`loopback`](crate::connection::loopback) for local use only.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotIpv4`] for IPv6 addresses and
    /// [`ServerError::Bind`] if the socket cannot be bound.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn bind(addr: SocketAddr, config: ServerConfig) -> Result<Self, ServerError> {
        if !addr.is_ipv4() {
            return Err(ServerError::NotIpv4(addr));
        }
        let socket = TcpSocket::new_v4().map_err(ServerError::Bind)?;
        socket.set_reuseaddr(true).map_err(ServerError::Bind)?;
        socket.bind(addr).map_err(ServerError::Bind)?;
        let listener = socket
            .listen(config.backlog_value())
            .map_err(ServerError::Bind)?;
        Self::from_listener(listener, config)
    }

    /// Adopt an already bound standard library listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotIpv4`] if the listener is bound to an IPv6
    /// address and [`ServerError::Bind`] if it cannot be registered with
    /// Tokio.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn bind_listener(
        listener: StdTcpListener,
        config: ServerConfig,
    ) -> Result<Self, ServerError> {
        listener.set_nonblocking(true).map_err(ServerError::Bind)?;
        let listener = TcpListener::from_std(listener).map_err(ServerError::Bind)?;
        Self::from_listener(listener, config)
    }

    fn from_listener(listener: TcpListener, config: ServerConfig) -> Result<Self, ServerError> {
        let local_addr = listener.local_addr().map_err(ServerError::Bind)?;
        if !local_addr.is_ipv4() {
            return Err(ServerError::NotIpv4(local_addr));
        }
        Ok(Self {
            listener,
            local_addr,
            config,
        })
    }

    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr { self.local_addr }
}

/// Controls a running [`FrameServer`]. Cheap to clone.
#[derive(Clone)]
pub struct ServerHandle {
    shared: Arc<ServerShared>,
    local_addr: SocketAddr,
}

impl ServerHandle {
    /// Queue `payload` as one frame for `client`.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::UnknownClient`] if the client is not connected
    /// and [`SendError::PayloadTooLarge`] if the payload does not fit a frame.
    pub fn send(&self, client: ClientId, payload: impl AsRef<[u8]>) -> Result<(), SendError> {
        let frame = Frame::from_payload(payload)?;
        self.shared.queue(client, frame)
    }

    /// Queue the bytes written so far to `message` as one frame for
    /// `client`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn send_message(&self, client: ClientId, message: &MessageWriter) -> Result<(), SendError> {
        self.send(client, message.as_bytes())
    }

    /// Queue `payload` for every connected client and return how many
    /// clients it was queued for.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadTooLarge`] if the payload does not fit a frame.
    pub fn send_to_all(&self, payload: impl AsRef<[u8]>) -> Result<usize, PayloadTooLarge> {
        let frame = Frame::from_payload(payload)?;
        Ok(self.shared.queue_all(&frame))
    }

    /// Disconnect `client`. Returns `false` if it was not connected.
    pub fn disconnect(&self, client: ClientId) -> bool {
        self.shared.remove(client, CloseReason::Requested)
    }

    /// Disconnect every client and return how many were connected.
    pub fn disconnect_all(&self) -> usize {
        self.shared
            .client_ids()
            .into_iter()
            .filter(|client| self.disconnect(*client))
            .count()
    }

    /// Ids of the connected clients, in accept order.
    #[must_use]
    pub fn clients(&self) -> Vec<ClientId> { self.shared.client_ids() }

    /// Number of connected clients.
    #[must_use]
    pub fn client_count(&self) -> usize { self.shared.client_count() }

    /// Remote address of `client`, if connected.
    #[must_use]
    pub fn peer_addr(&self, client: ClientId) -> Option<SocketAddr> { self.shared.peer_addr(client) }

    /// Address the server listens on.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr { self.local_addr }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.shared.shutdown.is_cancelled() }
}

impl fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHandle")
            .field("local_addr", &self.local_addr)
            .field("clients", &self.shared.client_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}
