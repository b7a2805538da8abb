//! Error types for the preview crate.
//!
//! - `PreviewError`: session operations that name something missing
//! - `ActionError`: a binding the dispatcher cannot run; logged, never
//!   returned from a dispatch

use crate::app::ScreenId;
use std::fmt;

/// Errors from preview session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    /// The screen is not part of the loaded app definition.
    ScreenNotFound { screen_id: ScreenId },
    /// No built-in device has this id.
    DeviceNotFound { device_id: String },
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScreenNotFound { screen_id } => write!(f, "screen not found: {screen_id}"),
            Self::DeviceNotFound { device_id } => write!(f, "device not found: {device_id}"),
        }
    }
}

impl std::error::Error for PreviewError {}

/// A bound action that cannot be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action type is not one the preview knows.
    UnknownType { action_type: String },
    /// A required parameter is absent or not a string.
    MissingParameter {
        action_type: String,
        parameter: &'static str,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType { action_type } => write!(f, "unknown action type: {action_type}"),
            Self::MissingParameter {
                action_type,
                parameter,
            } => write!(f, "{action_type} action is missing parameter {parameter}"),
        }
    }
}

impl std::error::Error for ActionError {}
