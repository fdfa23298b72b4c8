//! Errors and close reasons reported by a connection.

use std::{fmt, io, time::Duration};

use thiserror::Error;

use crate::frame::{PayloadTooLarge, ReassemblyError};

/// Lifecycle state of a [`Connection`](super::Connection).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No socket is open; `connect` may be called.
    #[default]
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The socket is open and the receive loop is running.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

/// Why a connection attempt failed.
///
/// Delivered through
/// [`ConnectionHandler::on_connection_failed`](super::ConnectionHandler::on_connection_failed).
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Host name resolution failed.
    #[error("failed to resolve endpoint: {0}")]
    Resolve(#[source] io::Error),

    /// The endpoint resolved, but to no IPv4 address.
    #[error("endpoint has no IPv4 address")]
    NoIpv4Address,

    /// Creating or configuring the socket failed.
    #[error("failed to prepare socket: {0}")]
    Socket(#[source] io::Error),

    /// The peer refused or the network failed while connecting.
    #[error("connect failed: {0}")]
    Connect(#[source] io::Error),

    /// The configured connect timeout elapsed.
    #[error("connect timed out after {0:?}")]
    TimedOut(Duration),
}

/// Errors returned synchronously by [`Connection`](super::Connection)
/// operations.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConnectionError {
    /// `connect` was called while the connection was not disconnected.
    #[error("invalid operation: connection is {0}")]
    InvalidOperation(ConnectionState),

    /// `send` was called without an established connection.
    #[error("connection is not established")]
    NotConnected,

    /// The payload does not fit a frame.
    #[error(transparent)]
    PayloadTooLarge(#[from] PayloadTooLarge),
}

/// Why an established or pending connection ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// The application called `close`.
    Requested,
    /// The peer shut down its side of the stream.
    PeerClosed,
    /// A socket read or write failed.
    Transport(io::ErrorKind),
    /// The peer sent bytes that could not be reassembled into frames.
    Protocol(ReassemblyError),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => f.write_str("closed locally"),
            Self::PeerClosed => f.write_str("closed by peer"),
            Self::Transport(kind) => write!(f, "transport error: {kind}"),
            Self::Protocol(err) => write!(f, "protocol error: {err}"),
        }
    }
}
