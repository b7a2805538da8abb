//! Transport abstraction.
//!
//! The channel never opens sockets itself. It asks a [`Transport`] for a
//! fresh [`Connection`] on every (re)connect attempt and drops the
//! connection when it fails.

use crate::error::TransportError;
use crate::message::WireMessage;
use appcanvas_core::Result;
use async_trait::async_trait;

/// Opens connections to the collaboration backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a new connection.
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError>;
}

/// One open connection.
///
/// Implementations skip undecodable incoming payloads after logging them;
/// `next` reports only failures of the connection itself.
#[async_trait]
pub trait Connection: Send {
    /// Sends a message.
    async fn send(&mut self, message: &WireMessage) -> Result<(), TransportError>;

    /// Waits for the next message. `None` means the peer closed the
    /// connection.
    ///
    /// Must be cancel safe: the channel polls it inside `select!`.
    async fn next(&mut self) -> Option<Result<WireMessage, TransportError>>;

    /// Closes the connection.
    async fn close(&mut self);
}
