//! Demo binary for `packetlink`: an echo server and a one-shot client.

mod cli;

use std::{error::Error, net::SocketAddr, time::Duration};

use clap::Parser;
use cli::{Cli, Command};
use packetlink::{
    connection::{Connection, ConnectionConfig, ConnectionEvent, event_channel},
    message::{MessageReader, MessageWriter},
    server::{FrameServer, ServerConfig, ServerEvent},
};
use tokio::{sync::mpsc::UnboundedReceiver, time::timeout};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Command::Serve { bind } => serve(bind).await,
        Command::Send {
            addr,
            text,
            timeout_secs,
        } => send(addr, &text, Duration::from_secs(timeout_secs)).await,
    }
}

async fn serve(bind: SocketAddr) -> Result<(), BoxError> {
    let server = FrameServer::bind(bind, ServerConfig::default().nodelay(true))?;
    let (handle, mut events) = server.start();
    println!("listening on {}", handle.local_addr());

    let echo = handle.clone();
    let pump = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let ServerEvent::FrameReceived { client, frame } = event
                && let Err(e) = echo.send(client, frame.payload())
            {
                tracing::warn!(%client, error = %e, "echo failed");
            }
        }
    });

    handle.close_on_ctrl_c().await?;
    pump.abort();
    Ok(())
}

async fn send(addr: String, text: &str, wait: Duration) -> Result<(), BoxError> {
    let mut message = MessageWriter::new();
    message.write_string(text)?;

    let (handler, mut events) = event_channel();
    let connection = Connection::new(ConnectionConfig::default().connect_timeout(Some(wait)), handler);
    connection.connect(addr)?;

    let reply = timeout(wait, await_reply(&connection, &message, &mut events)).await??;
    println!("{reply}");
    connection.close();
    Ok(())
}

/// Send `message` once connected and decode the first frame that comes back.
async fn await_reply(
    connection: &Connection,
    message: &MessageWriter,
    events: &mut UnboundedReceiver<ConnectionEvent>,
) -> Result<String, BoxError> {
    while let Some(event) = events.recv().await {
        match event {
            ConnectionEvent::Connected => connection.send_message(message)?,
            ConnectionEvent::ConnectionFailed(error) => return Err(error.into()),
            ConnectionEvent::FrameReceived(frame) => {
                return Ok(MessageReader::from_frame(&frame)?.read_string()?);
            }
            ConnectionEvent::Closed(reason) => {
                return Err(format!("connection closed before a reply: {reason}").into());
            }
            ConnectionEvent::DataReceived(_) | ConnectionEvent::BytesSent(_) => {}
        }
    }
    Err("connection dropped its event channel".into())
}
