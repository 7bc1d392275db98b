//! Transport layer (WebSocket client).
//!
//! The driver only talks to `Transport`/`Connector`; `ws` provides the
//! tokio-tungstenite implementation and `codec` classifies raw frames.

pub mod codec;
pub mod ws;

use async_trait::async_trait;

use chatline_core::error::Result;

pub use ws::{WsConnector, WsTransport};

/// What `recv` yields from a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Text(String),
    /// Any other frame (ping, pong, skipped binary). Only proves the peer is alive.
    Activity,
}

/// One established, bidirectional text channel.
///
/// `recv` must be cancel-safe: it is polled inside `tokio::select!` and a
/// cancelled call must not lose a frame.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send one text frame.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Next frame; `None` once the peer closed the stream.
    async fn recv(&mut self) -> Option<Result<Incoming>>;

    /// Keepalive ping.
    async fn ping(&mut self) -> Result<()>;

    /// Graceful shutdown.
    async fn close(&mut self) -> Result<()>;
}

/// Opens transports to an endpoint URL.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    async fn connect(&self, url: &str) -> Result<Self::Transport>;
}
