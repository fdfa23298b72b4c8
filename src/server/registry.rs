//! Client bookkeeping shared by the accept loop, client tasks, and handles.

use std::{
    net::SocketAddr,
    sync::atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;
use log::info;
use tokio::sync::mpsc;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::{ClientId, SendError, ServerConfig, ServerEvent};
use crate::{connection::CloseReason, frame::Frame, metrics};

struct ClientEntry {
    peer: SocketAddr,
    outbound: mpsc::UnboundedSender<Frame>,
    cancel: CancellationToken,
}

/// State shared by everything a running server spawns.
///
/// Removal from `clients` decides who reports a disconnect: whichever path
/// removes the entry emits the event, so each client disconnects once.
pub(super) struct ServerShared {
    pub(super) config: ServerConfig,
    pub(super) shutdown: CancellationToken,
    pub(super) tracker: TaskTracker,
    clients: DashMap<ClientId, ClientEntry>,
    events: mpsc::UnboundedSender<ServerEvent>,
    next_id: AtomicU64,
}

impl ServerShared {
    pub(super) fn new(config: ServerConfig, events: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            clients: DashMap::new(),
            events,
            next_id: AtomicU64::new(1),
        }
    }

    pub(super) fn emit(&self, event: ServerEvent) { let _ = self.events.send(event); }

    /// Emit an event on behalf of `client` only while it is still
    /// registered. The map entry stays borrowed across the send, so a
    /// concurrent [`remove`](Self::remove) queues `ClientDisconnected` after
    /// it. Returns `false` once the client is gone.
    pub(super) fn emit_for(&self, client: ClientId, event: ServerEvent) -> bool {
        let Some(_entry) = self.clients.get(&client) else {
            return false;
        };
        self.emit(event);
        true
    }

    /// Record a newly accepted client and announce it.
    pub(super) fn register(
        &self,
        peer: SocketAddr,
    ) -> (ClientId, mpsc::UnboundedReceiver<Frame>, CancellationToken) {
        let client = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbound, queued) = mpsc::unbounded_channel();
        let cancel = self.shutdown.child_token();
        self.clients.insert(
            client,
            ClientEntry {
                peer,
                outbound,
                cancel: cancel.clone(),
            },
        );
        metrics::inc_connections();
        info!("client accepted: client={client}, peer_addr={peer}");
        self.emit(ServerEvent::ClientAccepted { client, peer });
        (client, queued, cancel)
    }

    pub(super) fn queue(&self, client: ClientId, frame: Frame) -> Result<(), SendError> {
        let entry = self
            .clients
            .get(&client)
            .ok_or(SendError::UnknownClient(client))?;
        entry
            .outbound
            .send(frame)
            .map_err(|_| SendError::UnknownClient(client))
    }

    /// Queue `frame` for every client and return how many accepted it.
    pub(super) fn queue_all(&self, frame: &Frame) -> usize {
        self.clients
            .iter()
            .filter(|entry| entry.outbound.send(frame.clone()).is_ok())
            .count()
    }

    /// Drop `client` and report `reason`. Returns `false` if it was already
    /// gone.
    pub(super) fn remove(&self, client: ClientId, reason: CloseReason) -> bool {
        let Some((_, entry)) = self.clients.remove(&client) else {
            return false;
        };
        entry.cancel.cancel();
        metrics::dec_connections();
        match &reason {
            CloseReason::Requested | CloseReason::PeerClosed => {
                info!("client disconnected: client={client}, peer_addr={}, reason={reason}", entry.peer);
            }
            CloseReason::Transport(_) | CloseReason::Protocol(_) => {
                metrics::inc_errors();
                log::warn!(
                    "client disconnected abnormally: client={client}, peer_addr={}, reason={reason}",
                    entry.peer
                );
            }
        }
        self.emit(ServerEvent::ClientDisconnected { client, reason });
        true
    }

    pub(super) fn client_ids(&self) -> Vec<ClientId> {
        let mut ids: Vec<ClientId> = self.clients.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub(super) fn client_count(&self) -> usize { self.clients.len() }

    pub(super) fn peer_addr(&self, client: ClientId) -> Option<SocketAddr> {
        self.clients.get(&client).map(|entry| entry.peer)
    }
}
