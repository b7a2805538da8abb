//! Collaboration wire message.
//!
//! Every message on the channel is a JSON envelope:
//!
//! ```json
//! {"event": "node:moved", "data": {...}, "timestamp": "2024-05-01T12:00:00Z"}
//! ```
//!
//! There is no sequence number; receivers order by `timestamp` where it
//! matters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Announces a user coming online. Carries `{"userId": ...}`.
pub const USER_JOINED: &str = "user:joined";

/// Announces a user going offline. Carries `{"userId": ...}`.
pub const USER_LEFT: &str = "user:left";

/// Subscribing to this event name receives every message.
pub const WILDCARD: &str = "*";

/// A message exchanged between collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl WireMessage {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    /// Sets the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Returns the `userId` carried by presence messages.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.data.get("userId").and_then(Value::as_str)
    }

    /// Serializes to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid message.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
