//! Per-client tasks for [`FrameServer`](super::FrameServer).

use std::{io, net::SocketAddr, panic::AssertUnwindSafe, sync::Arc};

use bytes::BytesMut;
use futures::FutureExt;
use log::{error, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    select,
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;

use super::{ClientId, ServerEvent, registry::ServerShared};
use crate::{
    connection::CloseReason,
    frame::{Frame, FrameReassembler},
    metrics::{self, Direction},
    panic::format_panic,
};

/// Register an accepted stream and spawn its reader and writer, logging and
/// discarding any panics.
pub(super) fn spawn_client_task(shared: &Arc<ServerShared>, stream: TcpStream, peer: SocketAddr) {
    if let Some(enabled) = shared.config.nodelay_value()
        && let Err(e) = stream.set_nodelay(enabled)
    {
        warn!("failed to set TCP_NODELAY: error={e}, peer_addr={peer}");
    }

    let (client, queued, cancel) = shared.register(peer);
    let (reader, writer) = stream.into_split();

    shared.tracker.spawn(write_frames(
        Arc::clone(shared),
        client,
        writer,
        queued,
        cancel.clone(),
    ));

    let task_shared = Arc::clone(shared);
    shared.tracker.spawn(async move {
        let fut = AssertUnwindSafe(read_frames(&task_shared, client, reader, cancel)).catch_unwind();

        if let Err(panic) = fut.await {
            let panic_msg = format_panic(panic);
            // Emit via both `log` and `tracing` for tests that capture either.
            error!("client task panicked: panic={panic_msg}, client={client}, peer_addr={peer}");
            tracing::error!(panic = %panic_msg, %client, %peer, "client task panicked");
            task_shared.remove(client, CloseReason::Transport(io::ErrorKind::Other));
        }
    });
}

/// Read until the client goes away, reporting frames then raw chunks.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! expands to modulus internally"
)]
async fn read_frames(
    shared: &ServerShared,
    client: ClientId,
    mut reader: OwnedReadHalf,
    cancel: CancellationToken,
) {
    let size = shared.config.receive_buffer_size_value();
    let mut reassembler = FrameReassembler::new(shared.config.reassembly_capacity_value())
        .with_max_frame_length(shared.config.max_frame_length_value());

    let reason = loop {
        let mut chunk = BytesMut::with_capacity(size);
        let read = select! {
            biased;

            () = cancel.cancelled() => return,
            res = reader.read_buf(&mut chunk) => res,
        };

        match read {
            Ok(0) => break CloseReason::PeerClosed,
            Ok(_) => {
                let chunk = chunk.freeze();
                let mut live = true;
                let outcome = reassembler.add_bytes(&chunk, |frame| {
                    live = live
                        && !cancel.is_cancelled()
                        && shared.emit_for(client, ServerEvent::FrameReceived { client, frame });
                    if live {
                        metrics::inc_frames(Direction::Inbound);
                    }
                });
                if !live || cancel.is_cancelled() {
                    return;
                }
                if let Err(err) = outcome {
                    tracing::error!(%client, error = %err, "discarding unframeable input");
                    break CloseReason::Protocol(err);
                }
                if !shared.emit_for(client, ServerEvent::DataReceived { client, chunk }) {
                    return;
                }
            }
            Err(e) => break CloseReason::Transport(e.kind()),
        }
    };
    shared.remove(client, reason);
}

/// Drain the client's queue, one whole frame per write.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "tokio::select! expands to modulus internally"
)]
async fn write_frames(
    shared: Arc<ServerShared>,
    client: ClientId,
    mut writer: OwnedWriteHalf,
    mut queued: mpsc::UnboundedReceiver<Frame>,
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

        match written {
            Ok(()) => {
                let sent = ServerEvent::DataSent {
                    client,
                    bytes: frame.wire_len(),
                };
                if cancel.is_cancelled() || !shared.emit_for(client, sent) {
                    break;
                }
                metrics::inc_frames(Direction::Outbound);
            }
            Err(e) => {
                shared.remove(client, CloseReason::Transport(e.kind()));
                break;
            }
        }
    }
}
