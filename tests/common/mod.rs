//! Shared utilities for integration tests.
//!
//! Helpers to start a server on a free loopback port and to await events
//! with a timeout.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::{
    net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener},
    time::Duration,
};

use packetlink::{
    connection::ConnectionEvent,
    server::{FrameServer, ServerConfig, ServerEvent, ServerHandle},
};
use tokio::{sync::mpsc::UnboundedReceiver, time::timeout};

/// Upper bound on how long any single expected event may take.
pub const WAIT: Duration = Duration::from_secs(5);

/// Create a TCP listener bound to a free local port.
#[expect(
    clippy::expect_used,
    reason = "binding to an ephemeral localhost port must abort the test immediately"
)]
pub fn unused_listener() -> StdTcpListener {
    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
    StdTcpListener::bind(addr).expect("failed to bind port")
}

/// Bind and start a server on a free loopback port.
pub fn start_server(config: ServerConfig) -> (ServerHandle, UnboundedReceiver<ServerEvent>) {
    FrameServer::bind_listener(unused_listener(), config)
        .expect("adopt listener")
        .start()
}

/// Await the next event on `events`, failing the test after [`WAIT`].
pub async fn next<T>(events: &mut UnboundedReceiver<T>) -> T {
    timeout(WAIT, events.recv())
        .await
        .expect("event within timeout")
        .expect("event channel open")
}

/// Skip events until `pick` returns `Some`.
pub async fn next_matching<T, R>(
    events: &mut UnboundedReceiver<T>,
    mut pick: impl FnMut(T) -> Option<R>,
) -> R {
    loop {
        if let Some(found) = pick(next(events).await) {
            return found;
        }
    }
}

/// Skip client events until the connection reports `Connected`.
pub async fn wait_connected(events: &mut UnboundedReceiver<ConnectionEvent>) {
    next_matching(events, |event| match event {
        ConnectionEvent::Connected => Some(()),
        ConnectionEvent::ConnectionFailed(error) => panic!("connect failed: {error}"),
        _ => None,
    })
    .await;
}
