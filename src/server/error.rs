//! Errors raised by [`FrameServer`](super::FrameServer) operations.

use std::{io, net::SocketAddr};

use thiserror::Error;

use super::ClientId;
use crate::frame::PayloadTooLarge;

/// Errors that may occur while setting up the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or configuring the listening socket failed.
    #[error("bind error: {0}")]
    Bind(#[source] io::Error),

    /// The transport only listens on IPv4 addresses.
    #[error("not an IPv4 address: {0}")]
    NotIpv4(SocketAddr),
}

/// Errors returned when queueing a frame for a client.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SendError {
    /// No client with this id is connected.
    #[error("unknown client {0}")]
    UnknownClient(ClientId),

    /// The payload does not fit a frame.
    #[error(transparent)]
    PayloadTooLarge(#[from] PayloadTooLarge),
}
