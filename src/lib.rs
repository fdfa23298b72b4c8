#![doc(html_root_url = "https://docs.rs/packetlink/latest")]
//! Public API for the `packetlink` library.
//!
//! Length-prefixed message transport over TCP:
//!
//! - [`message`] encodes and decodes little-endian fields,
//! - [`frame`] prefixes payloads with their length and reassembles frames from
//!   a byte stream,
//! - [`connection`] is an asynchronous client with callback notifications,
//! - [`server`] accepts many clients and reports their traffic as events.

pub mod byte_order;
pub mod connection;
pub mod frame;
pub mod message;
pub mod metrics;
pub mod panic;
pub mod ring_buffer;
pub mod server;

pub use connection::{
    CloseReason,
    Connection,
    ConnectionConfig,
    ConnectionError,
    ConnectionEvent,
    ConnectionHandler,
    ConnectionState,
};
pub use frame::{Frame, FrameReassembler, ReassemblyError};
pub use message::{MessageReader, MessageWriter};
pub use metrics::{CONNECTIONS_ACTIVE, Direction, ERRORS_TOTAL, FRAMES_PROCESSED};
pub use server::{ClientId, FrameServer, ServerEvent, ServerHandle};
