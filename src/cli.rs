//! Command line interface for the `packetlink` demo binary.
//!
//! Shared with `build.rs`, which renders the man page from it.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};

/// Command line arguments for the `packetlink` binary.
#[derive(Debug, Parser)]
#[command(
    name = "packetlink",
    version,
    about = "Length-prefixed message transport over TCP"
)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the demo binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an echo server that returns every frame to its sender.
    Serve {
        /// IPv4 address to listen on.
        #[arg(short, long, default_value = "127.0.0.1:7000")]
        bind: SocketAddr,
    },
    /// Connect, send one text message, and print the echoed reply.
    Send {
        /// Server address, as `host:port`.
        #[arg(short, long, default_value = "127.0.0.1:7000")]
        addr: String,
        /// Text to send as a UTF-16LE string field.
        #[arg(short, long)]
        text: String,
        /// Seconds to wait for the reply.
        #[arg(long, default_value_t = 5)]
        timeout_secs: u64,
    },
}
