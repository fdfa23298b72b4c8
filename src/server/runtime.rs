//! Runtime control for [`FrameServer`].

mod accept;
mod backoff;

use std::sync::Arc;

#[cfg(test)]
pub(super) use accept::MockAcceptListener;
pub(super) use accept::accept_loop;
pub use backoff::BackoffConfig;
use tokio::{signal, sync::mpsc};

use super::{FrameServer, ServerEvent, ServerHandle, registry::ServerShared};

impl FrameServer {
    /// Start accepting clients in the background.
    ///
    /// Returns a handle for sending to and disconnecting clients, and the
    /// receiver on which every [`ServerEvent`] is delivered in order per
    /// client.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    ///
    /// # Examples
    ///
    /// ```
    /// use packetlink::{
    ///     connection::loopback,
    ///     server::{FrameServer, ServerConfig},
    /// };
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), packetlink::server::ServerError> {
    /// let server = FrameServer::bind(loopback(0), ServerConfig::default())?;
    /// let (handle, _events) = server.start();
    /// assert_eq!(handle.client_count(), 0);
    /// handle.close().await;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn start(self) -> (ServerHandle, mpsc::UnboundedReceiver<ServerEvent>) {
        let FrameServer {
            listener,
            local_addr,
            config,
        } = self;
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(ServerShared::new(config, events));

        shared
            .tracker
            .spawn(accept_loop(Arc::new(listener), Arc::clone(&shared)));
        tracing::info!(%local_addr, "server listening");

        (ServerHandle { shared, local_addr }, receiver)
    }
}

impl ServerHandle {
    /// Stop accepting, disconnect every client, and wait for all server
    /// tasks to finish.
    ///
    /// Each client still connected is reported as disconnected with
    /// [`CloseReason::Requested`](crate::connection::CloseReason::Requested).
    pub async fn close(&self) {
        self.shared.shutdown.cancel();
        self.shared.tracker.close();
        self.shared.tracker.wait().await;
        let disconnected = self.disconnect_all();
        tracing::info!(local_addr = %self.local_addr, disconnected, "server closed");
    }

    /// Run until Ctrl+C, then [`close`](Self::close).
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handler cannot be installed; the server
    /// is closed either way.
    pub async fn close_on_ctrl_c(&self) -> std::io::Result<()> {
        let outcome = signal::ctrl_c().await;
        self.close().await;
        outcome
    }
}
