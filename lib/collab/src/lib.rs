//! Realtime collaboration channel for appcanvas.
//!
//! A thin pub/sub layer used to broadcast presence and edit events between
//! collaborators:
//!
//! - [`WireMessage`]: the `{event, data, timestamp}` envelope on the wire
//! - [`SubscriptionHub`]: per-event fan-out returning cancellable
//!   [`Subscription`] handles
//! - [`Presence`]: the set of online users, tolerant of reordering
//! - [`CollabChannel`]: the reconnecting connection with bounded backoff
//! - [`Transport`]: the injected connection factory, with WebSocket and NATS
//!   implementations

pub mod channel;
pub mod error;
pub mod hub;
pub mod message;
pub mod nats;
pub mod presence;
pub mod transport;
pub mod websocket;

pub use channel::{CollabChannel, ConnectionStatus, ReconnectPolicy};
pub use error::{ChannelError, TransportError};
pub use hub::{Subscription, SubscriptionHub};
pub use message::{USER_JOINED, USER_LEFT, WILDCARD, WireMessage};
pub use nats::{NatsConfig, NatsTransport};
pub use presence::Presence;
pub use transport::{Connection, Transport};
pub use websocket::WebSocketTransport;
