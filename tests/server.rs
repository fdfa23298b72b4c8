//! Integration tests for `FrameServer` using raw TCP clients.

mod common;

use std::net::{Ipv6Addr, SocketAddr};

use common::{WAIT, next, next_matching, start_server};
use packetlink::{
    connection::CloseReason,
    frame::ReassemblyError,
    server::{ClientId, FrameServer, SendError, ServerConfig, ServerError, ServerEvent},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc::UnboundedReceiver,
    time::timeout,
};

async fn accept_client(
    addr: SocketAddr,
    events: &mut UnboundedReceiver<ServerEvent>,
) -> (TcpStream, ClientId) {
    let stream = TcpStream::connect(addr).await.expect("connect");
    let client = next_matching(events, |event| match event {
        ServerEvent::ClientAccepted { client, .. } => Some(client),
        _ => None,
    })
    .await;
    (stream, client)
}

async fn read_frame(stream: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 4];
    timeout(WAIT, stream.read_exact(&mut header))
        .await
        .expect("header within timeout")
        .expect("read header");
    let mut payload = vec![0u8; usize::try_from(u32::from_le_bytes(header)).expect("fits")];
    stream.read_exact(&mut payload).await.expect("read payload");
    payload
}

#[tokio::test]
async fn frames_precede_raw_data_per_read() {
    let (server, mut events) = start_server(ServerConfig::default());
    let (mut stream, client) = accept_client(server.local_addr(), &mut events).await;

    stream
        .write_all(&[1, 0, 0, 0, b'a', 0, 0, 0, 0])
        .await
        .expect("write");

    let mut frames = Vec::new();
    let chunk_len = loop {
        match next(&mut events).await {
            ServerEvent::FrameReceived { client: from, frame } => {
                assert_eq!(from, client);
                frames.push(frame.payload().to_vec());
            }
            ServerEvent::DataReceived { chunk, .. } => break chunk.len(),
            other => panic!("unexpected event {other:?}"),
        }
    };
    assert_eq!(frames, vec![b"a".to_vec(), Vec::new()]);
    assert_eq!(chunk_len, 9);

    server.close().await;
}

#[tokio::test]
async fn send_to_all_reaches_every_client() {
    let (server, mut events) = start_server(ServerConfig::default());
    let (mut first, _) = accept_client(server.local_addr(), &mut events).await;
    let (mut second, _) = accept_client(server.local_addr(), &mut events).await;
    assert_eq!(server.client_count(), 2);

    assert_eq!(server.send_to_all(b"all").expect("small payload"), 2);
    assert_eq!(read_frame(&mut first).await, b"all");
    assert_eq!(read_frame(&mut second).await, b"all");

    let sent = next_matching(&mut events, |event| match event {
        ServerEvent::DataSent { bytes, .. } => Some(bytes),
        _ => None,
    })
    .await;
    assert_eq!(sent, 7);

    server.close().await;
}

#[tokio::test]
async fn send_targets_one_client() {
    let (server, mut events) = start_server(ServerConfig::default());
    let (mut stream, client) = accept_client(server.local_addr(), &mut events).await;

    server.send(client, b"only you").expect("client connected");
    assert_eq!(read_frame(&mut stream).await, b"only you");
    assert_eq!(server.peer_addr(client), Some(stream.local_addr().expect("addr")));

    server.close().await;
}

#[tokio::test]
async fn send_to_departed_client_fails() {
    let (server, mut events) = start_server(ServerConfig::default());
    let (_stream, client) = accept_client(server.local_addr(), &mut events).await;

    assert!(server.disconnect(client));
    assert!(!server.disconnect(client), "second disconnect is a no-op");
    assert_eq!(
        server.send(client, b"late"),
        Err(SendError::UnknownClient(client))
    );

    server.close().await;
}

#[tokio::test]
async fn client_eof_is_reported_once() {
    let (server, mut events) = start_server(ServerConfig::default());
    let (stream, client) = accept_client(server.local_addr(), &mut events).await;

    drop(stream);

    let (gone, reason) = next_matching(&mut events, |event| match event {
        ServerEvent::ClientDisconnected { client, reason } => Some((client, reason)),
        _ => None,
    })
    .await;
    assert_eq!(gone, client);
    assert_eq!(reason, CloseReason::PeerClosed);
    assert_eq!(server.client_count(), 0);

    server.close().await;
}

#[tokio::test]
async fn oversized_frame_disconnects_client() {
    let (server, mut events) = start_server(ServerConfig::default().max_frame_length(Some(16)));
    let (mut stream, client) = accept_client(server.local_addr(), &mut events).await;

    stream.write_all(&[17, 0, 0, 0]).await.expect("write");

    let (gone, reason) = next_matching(&mut events, |event| match event {
        ServerEvent::ClientDisconnected { client, reason } => Some((client, reason)),
        _ => None,
    })
    .await;
    assert_eq!(gone, client);
    assert_eq!(
        reason,
        CloseReason::Protocol(ReassemblyError::FrameTooLarge { size: 17, max: 16 })
    );

    server.close().await;
}

#[tokio::test]
async fn close_disconnects_everyone() {
    let (server, mut events) = start_server(ServerConfig::default());
    let (mut stream, client) = accept_client(server.local_addr(), &mut events).await;

    server.close().await;
    assert!(server.is_closed());
    assert_eq!(server.client_count(), 0);

    let reason = next_matching(&mut events, |event| match event {
        ServerEvent::ClientDisconnected { client: gone, reason } if gone == client => Some(reason),
        _ => None,
    })
    .await;
    assert_eq!(reason, CloseReason::Requested);

    let mut buf = [0u8; 1];
    let read = timeout(WAIT, stream.read(&mut buf))
        .await
        .expect("read within timeout")
        .expect("read");
    assert_eq!(read, 0);
}

#[tokio::test]
async fn ipv6_bind_is_rejected() {
    let addr = SocketAddr::from((Ipv6Addr::LOCALHOST, 0));
    let err = FrameServer::bind(addr, ServerConfig::default()).expect_err("IPv4 only");
    assert!(matches!(err, ServerError::NotIpv4(a) if a == addr));
}
