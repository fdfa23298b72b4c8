//! I/O tasks behind a connection: connect, receive loop, and writer.

use std::{io, panic::AssertUnwindSafe, sync::Arc};

use bytes::BytesMut;
use futures::FutureExt;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpSocket,
        TcpStream,
        ToSocketAddrs,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    select,
    sync::mpsc,
    time::timeout,
};
use tokio_util::sync::CancellationToken;

use super::{CloseReason, ConnectError, ConnectionConfig, Shared, resolve_ipv4};
use crate::{frame::Frame, panic::format_panic};

/// Spawn `task` for `generation`, closing the connection if it panics.
///
/// Handler callbacks run inside these tasks.
pub(super) fn spawn_guarded<F>(shared: Arc<Shared>, generation: u64, task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let runtime = shared.runtime.clone();
    runtime.spawn(async move {
        if let Err(panic) = AssertUnwindSafe(task).catch_unwind().await {
            let panic_msg = format_panic(panic);
            // Emit via both `log` and `tracing` for tests that capture either.
            log::error!("connection task panicked: panic={panic_msg}, generation={generation}");
            tracing::error!(panic = %panic_msg, generation, "connection task panicked");
            shared.close(generation, CloseReason::Transport(io::ErrorKind::Other));
        }
    });
}

/// Drive one connection generation from connect to close.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! expands to modulus internally"
)]
pub(super) async fn run<A>(
    shared: Arc<Shared>,
    endpoint: A,
    generation: u64,
    cancel: CancellationToken,
) where
    A: ToSocketAddrs + Send + 'static,
{
    let opened = select! {
        biased;

        () = cancel.cancelled() => return,
        res = open_stream(endpoint, &shared.config) => res,
    };

    let stream = match opened {
        Ok(stream) => stream,
        Err(error) => {
            shared.connect_failed(generation, error);
            return;
        }
    };

    let local_addr = stream.local_addr().ok();
    let peer_addr = stream.peer_addr().ok();
    let (reader, writer) = stream.into_split();
    let (outbound, queued) = mpsc::unbounded_channel();

    if !shared.connected(generation, outbound, local_addr, peer_addr) {
        return;
    }

    spawn_guarded(
        Arc::clone(&shared),
        generation,
        write_frames(Arc::clone(&shared), writer, queued, generation, cancel.clone()),
    );
    receive(&shared, reader, generation, &cancel).await;
}

/// Resolve the endpoint and connect a configured IPv4 socket.
async fn open_stream<A: ToSocketAddrs>(
    endpoint: A,
    config: &ConnectionConfig,
) -> Result<TcpStream, ConnectError> {
    let addr = resolve_ipv4(endpoint).await?;
    let socket = TcpSocket::new_v4().map_err(ConnectError::Socket)?;
    config
        .socket_options_value()
        .apply(&socket)
        .map_err(ConnectError::Socket)?;

    let connecting = socket.connect(addr);
    match config.connect_timeout_value() {
        Some(limit) => timeout(limit, connecting)
            .await
            .map_err(|_| ConnectError::TimedOut(limit))?
            .map_err(ConnectError::Connect),
        None => connecting.await.map_err(ConnectError::Connect),
    }
}

/// Keep exactly one read outstanding until the connection ends.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! expands to modulus internally"
)]
async fn receive(
    shared: &Shared,
    mut reader: OwnedReadHalf,
    generation: u64,
    cancel: &CancellationToken,
) {
    let size = shared.config.receive_buffer_size_value();
    loop {
        let mut chunk = BytesMut::with_capacity(size);
        let read = select! {
            biased;

            () = cancel.cancelled() => return,
            res = reader.read_buf(&mut chunk) => res,
        };

        match read {
            Ok(0) => {
                shared.close(generation, CloseReason::PeerClosed);
                return;
            }
            Ok(_) => {
                if !shared.deliver(generation, chunk.freeze()) {
                    return;
                }
            }
            Err(e) => {
                shared.close(generation, CloseReason::Transport(e.kind()));
                return;
            }
        }
    }
}

/// Write queued frames one at a time so concurrent sends never interleave.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! expands to modulus internally"
)]
async fn write_frames(
    shared: Arc<Shared>,
    mut writer: OwnedWriteHalf,
    mut queued: mpsc::UnboundedReceiver<Frame>,
    generation: u64,
    cancel: CancellationToken,
) {
    loop {
        let frame = select! {
            biased;

            () = cancel.cancelled() => break,
            next = queued.recv() => match next {
                Some(frame) => frame,
                None => break,
            },
        };

        let written = select! {
            biased;

            () = cancel.cancelled() => break,
            res = writer.write_all(frame.as_ref()) => res,
        };

        if let Err(e) = written {
            shared.close(generation, CloseReason::Transport(e.kind()));
            break;
        }
        shared.bytes_sent(generation, frame.wire_len());
    }
    tracing::trace!(generation, "writer finished");
}
