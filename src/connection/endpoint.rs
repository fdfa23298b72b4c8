//! Endpoint helpers. The transport is IPv4 only.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use tokio::net::{ToSocketAddrs, lookup_host};

use super::ConnectError;

/// Resolve `endpoint` and return its first IPv4 address.
///
/// # Errors
///
/// Returns [`ConnectError::Resolve`] if the lookup fails and
/// [`ConnectError::NoIpv4Address`] if it yields only IPv6 addresses.
///
/// # Examples
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), packetlink::connection::ConnectError> {
/// use packetlink::connection::resolve_ipv4;
///
/// let addr = resolve_ipv4("127.0.0.1:7000").await?;
/// assert_eq!(addr.port(), 7000);
/// # Ok(())
/// # }
/// ```
pub async fn resolve_ipv4<A: ToSocketAddrs>(endpoint: A) -> Result<SocketAddr, ConnectError> {
    lookup_host(endpoint)
        .await
        .map_err(ConnectError::Resolve)?
        .find(SocketAddr::is_ipv4)
        .ok_or(ConnectError::NoIpv4Address)
}

/// The IPv4 loopback address with `port`.
#[must_use]
pub fn loopback(port: u16) -> SocketAddr { SocketAddrV4::new(Ipv4Addr::LOCALHOST, port).into() }

/// The IPv4 wildcard address with `port`, for listening on all interfaces.
#[must_use]
pub fn any(port: u16) -> SocketAddr { SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port).into() }
