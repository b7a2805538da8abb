//! WebSocket transport.
//!
//! Messages travel as JSON text frames. Binary frames holding JSON are
//! accepted too; anything else is logged and skipped.

use crate::error::TransportError;
use crate::message::WireMessage;
use crate::transport::{Connection, Transport};
use appcanvas_core::Result;
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to a collaboration room over WebSocket.
#[derive(Debug, Clone)]
pub struct WebSocketTransport {
    url: String,
}

impl WebSocketTransport {
    /// Creates a transport for a `ws://` or `wss://` URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError> {
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::ConnectFailed {
                details: format!("{}: {e}", self.url),
            })?;
        info!(url = %self.url, "websocket connected");

        let (sink, stream) = stream.split();
        Ok(Box::new(WebSocketConnection { sink, stream }))
    }
}

struct WebSocketConnection {
    sink: SplitSink<WsStream, WsMessage>,
    stream: SplitStream<WsStream>,
}

fn decode(bytes: &[u8]) -> Option<WireMessage> {
    match WireMessage::from_json_bytes(bytes) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!(error = %e, "dropping undecodable message");
            None
        }
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send(&mut self, message: &WireMessage) -> Result<(), TransportError> {
        let text = message.to_json().map_err(|e| TransportError::Encode {
            details: e.to_string(),
        })?;
        self.sink
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|e| TransportError::SendFailed {
                details: e.to_string(),
            })?;
        Ok(())
    }

    async fn next(&mut self) -> Option<Result<WireMessage, TransportError>> {
        loop {
            let frame = match self.stream.next().await? {
                Ok(frame) => frame,
                Err(e) => {
                    return Some(Err(TransportError::ReceiveFailed {
                        details: e.to_string(),
                    }
                    .into()));
                }
            };

            let message = match frame {
                WsMessage::Text(text) => decode(text.as_bytes()),
                WsMessage::Binary(bytes) => decode(&bytes),
                WsMessage::Close(reason) => {
                    debug!(?reason, "websocket closed by peer");
                    return None;
                }
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => None,
            };

            if let Some(message) = message {
                return Some(Ok(message));
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.sink.close().await {
            debug!(error = %e, "websocket close failed");
        }
    }
}
