//! Core domain types and utilities for appcanvas.
//!
//! This crate provides the identifiers and the error-handling foundation
//! shared by the workflow editor, the preview engine and the collaboration
//! channel.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ConnectionId, InteractionId, NodeId, ParseIdError, WorkflowId};
