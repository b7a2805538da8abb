//! Error types for the collaboration channel.
//!
//! Errors are designed for layered context using rootcause:
//! - `TransportError`: a transport failed to connect, send or receive
//! - `ChannelError`: the channel itself can no longer accept work

use std::fmt;

/// Transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Could not establish a connection.
    ConnectFailed {
        /// Error details.
        details: String,
    },
    /// An outgoing message could not be delivered.
    SendFailed {
        /// Error details.
        details: String,
    },
    /// The connection failed while receiving.
    ReceiveFailed {
        /// Error details.
        details: String,
    },
    /// A message could not be encoded.
    Encode {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed { details } => write!(f, "failed to connect: {details}"),
            Self::SendFailed { details } => write!(f, "failed to send message: {details}"),
            Self::ReceiveFailed { details } => write!(f, "connection failed: {details}"),
            Self::Encode { details } => write!(f, "failed to encode message: {details}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Channel-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel was closed and its connection task has exited.
    Closed,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "collaboration channel is closed"),
        }
    }
}

impl std::error::Error for ChannelError {}
