//! Socket options applied before a connection is established.

use std::{io, time::Duration};

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpSocket;

/// Options applied to the socket of a [`Connection`](super::Connection)
/// before it connects.
///
/// Every option is left at the operating system default unless set.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use packetlink::connection::SocketOptions;
///
/// let options = SocketOptions::default()
///     .nodelay(true)
///     .keepalive(Some(Duration::from_secs(30)));
/// assert_ne!(options, SocketOptions::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SocketOptions {
    nodelay: Option<bool>,
    keepalive: Option<Toggle>,
    linger: Option<Toggle>,
    send_buffer_size: Option<u32>,
    recv_buffer_size: Option<u32>,
    reuseaddr: Option<bool>,
}

/// An option that is either switched off or enabled with a duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Toggle {
    Off,
    On(Duration),
}

impl Toggle {
    fn from_option(value: Option<Duration>) -> Self { value.map_or(Self::Off, Self::On) }

    const fn duration(self) -> Option<Duration> {
        match self {
            Self::Off => None,
            Self::On(value) => Some(value),
        }
    }
}

impl SocketOptions {
    /// Set `TCP_NODELAY`, disabling Nagle's algorithm when `true`.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = Some(enabled);
        self
    }

    /// Enable `SO_KEEPALIVE` with the given idle time, or disable it with
    /// `None`.
    #[must_use]
    pub fn keepalive(mut self, idle: Option<Duration>) -> Self {
        self.keepalive = Some(Toggle::from_option(idle));
        self
    }

    /// Set `SO_LINGER`; `None` disables lingering on close.
    #[must_use]
    pub fn linger(mut self, duration: Option<Duration>) -> Self {
        self.linger = Some(Toggle::from_option(duration));
        self
    }

    /// Set the kernel send buffer size.
    #[must_use]
    pub fn send_buffer_size(mut self, size: u32) -> Self {
        self.send_buffer_size = Some(size);
        self
    }

    /// Set the kernel receive buffer size.
    #[must_use]
    pub fn recv_buffer_size(mut self, size: u32) -> Self {
        self.recv_buffer_size = Some(size);
        self
    }

    /// Set `SO_REUSEADDR`.
    #[must_use]
    pub fn reuseaddr(mut self, enabled: bool) -> Self {
        self.reuseaddr = Some(enabled);
        self
    }

    /// Apply every configured option to `socket`.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by the operating system.
    pub fn apply(&self, socket: &TcpSocket) -> io::Result<()> {
        if let Some(enabled) = self.nodelay {
            socket.set_nodelay(enabled)?;
        }
        if let Some(keepalive) = self.keepalive {
            apply_keepalive(socket, keepalive)?;
        }
        if let Some(linger) = self.linger {
            socket.set_linger(linger.duration())?;
        }
        if let Some(size) = self.send_buffer_size {
            socket.set_send_buffer_size(size)?;
        }
        if let Some(size) = self.recv_buffer_size {
            socket.set_recv_buffer_size(size)?;
        }
        if let Some(enabled) = self.reuseaddr {
            socket.set_reuseaddr(enabled)?;
        }
        Ok(())
    }
}

fn apply_keepalive(socket: &TcpSocket, keepalive: Toggle) -> io::Result<()> {
    match keepalive.duration() {
        Some(idle) => {
            socket.set_keepalive(true)?;
            SockRef::from(socket).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))
        }
        None => socket.set_keepalive(false),
    }
}
