use anyhow::{Context, Result};
use callroom_core::{ClientMessage, ConnectionId, ServerEvent};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::signal_helpers::EVENT_TIMEOUT_MS;

/// Client speaking the real WebSocket protocol against a spawned server.
pub struct WsTestClient {
    pub connection_id: ConnectionId,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTestClient {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (stream, _) = connect_async(format!("ws://{}/ws", addr))
            .await
            .context("WebSocket handshake failed")?;

        let mut client = Self {
            connection_id: ConnectionId::default(),
            stream,
        };

        match client.next_event().await? {
            ServerEvent::Welcome { connection_id } => client.connection_id = connection_id,
            other => anyhow::bail!("Expected welcome, got {:?}", other),
        }
        Ok(client)
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<()> {
        let text = serde_json::to_string(message)?;
        self.send_raw(text).await
    }

    pub async fn send_raw(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .context("Failed to send frame")
    }

    pub async fn next_event(&mut self) -> Result<ServerEvent> {
        let timeout = std::time::Duration::from_millis(EVENT_TIMEOUT_MS);

        loop {
            let frame = tokio::time::timeout(timeout, self.stream.next())
                .await
                .context("Timeout waiting for frame")?;

            match frame {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(&text).context("Server sent an unknown event");
                }
                Some(Ok(Message::Close(_))) | None => anyhow::bail!("Socket closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e).context("Socket error"),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await.context("Failed to close socket")
    }
}
