//! NATS transport.
//!
//! Each collaboration room maps to one subject, `appcanvas.collab.<room>`.
//! Collaborators publish JSON envelopes to it and subscribe to it. Echo is
//! disabled so a client does not receive its own broadcasts.

use crate::error::TransportError;
use crate::message::WireMessage;
use crate::transport::{Connection, Transport};
use appcanvas_core::Result;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};

/// Subject prefix for collaboration rooms.
const ROOM_SUBJECT_PREFIX: &str = "appcanvas.collab";

/// Configuration for the NATS transport.
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URL.
    pub url: String,
    /// Collaboration room; one subject per room.
    pub room: String,
}

impl NatsConfig {
    #[must_use]
    pub fn new(url: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            room: room.into(),
        }
    }

    /// Returns the subject for this room.
    #[must_use]
    pub fn subject(&self) -> String {
        format!("{ROOM_SUBJECT_PREFIX}.{}", self.room)
    }
}

/// Connects to a collaboration room over NATS.
#[derive(Debug, Clone)]
pub struct NatsTransport {
    config: NatsConfig,
}

impl NatsTransport {
    #[must_use]
    pub fn new(config: NatsConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transport for NatsTransport {
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError> {
        let client = async_nats::ConnectOptions::new()
            .no_echo()
            .connect(self.config.url.as_str())
            .await
            .map_err(|e| TransportError::ConnectFailed {
                details: format!("{}: {e}", self.config.url),
            })?;

        let subject = self.config.subject();
        let subscriber =
            client
                .subscribe(subject.clone())
                .await
                .map_err(|e| TransportError::ConnectFailed {
                    details: format!("failed to subscribe to {subject}: {e}"),
                })?;
        info!(url = %self.config.url, %subject, "nats connected");

        Ok(Box::new(NatsConnection {
            client,
            subscriber,
            subject,
        }))
    }
}

struct NatsConnection {
    client: async_nats::Client,
    subscriber: async_nats::Subscriber,
    subject: String,
}

#[async_trait]
impl Connection for NatsConnection {
    async fn send(&mut self, message: &WireMessage) -> Result<(), TransportError> {
        let bytes = serde_json::to_vec(message).map_err(|e| TransportError::Encode {
            details: e.to_string(),
        })?;
        self.client
            .publish(self.subject.clone(), bytes.into())
            .await
            .map_err(|e| TransportError::SendFailed {
                details: e.to_string(),
            })?;
        Ok(())
    }

    async fn next(&mut self) -> Option<Result<WireMessage, TransportError>> {
        loop {
            let message = self.subscriber.next().await?;
            match WireMessage::from_json_bytes(&message.payload) {
                Ok(decoded) => return Some(Ok(decoded)),
                Err(e) => warn!(subject = %message.subject, error = %e, "dropping undecodable message"),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.subscriber.unsubscribe().await {
            debug!(error = %e, "nats unsubscribe failed");
        }
        if let Err(e) = self.client.flush().await {
            debug!(error = %e, "nats flush failed");
        }
    }
}
