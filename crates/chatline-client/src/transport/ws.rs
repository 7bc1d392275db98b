//! WebSocket transport over tokio-tungstenite.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use chatline_core::error::{ChatlineError, Result};

use crate::transport::codec::{classify, Frame};
use crate::transport::{Connector, Incoming, Transport};

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, url: &str) -> Result<WsTransport> {
        let (stream, resp) = connect_async(url)
            .await
            .map_err(|e| ChatlineError::Transport(format!("connect failed: {e}")))?;
        tracing::debug!(status = %resp.status(), "websocket handshake done");
        Ok(WsTransport { stream })
    }
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| ChatlineError::Transport(format!("send failed: {e}")))
    }

    async fn recv(&mut self) -> Option<Result<Incoming>> {
        let msg = match self.stream.next().await? {
            Ok(m) => m,
            Err(e) => return Some(Err(ChatlineError::Transport(format!("read failed: {e}")))),
        };
        match classify(msg) {
            Frame::Text(s) => Some(Ok(Incoming::Text(s))),
            Frame::Close => None,
            Frame::Control => Some(Ok(Incoming::Activity)),
            Frame::Ignored { bytes_len } => {
                tracing::debug!(bytes_len, "non-text frame ignored");
                Some(Ok(Incoming::Activity))
            }
        }
    }

    async fn ping(&mut self) -> Result<()> {
        self.stream
            .send(Message::Ping(Vec::new()))
            .await
            .map_err(|e| ChatlineError::Transport(format!("ping failed: {e}")))
    }

    async fn close(&mut self) -> Result<()> {
        self.stream
            .close(None)
            .await
            .map_err(|e| ChatlineError::Transport(format!("close failed: {e}")))
    }
}
