//! Studio error types.

use std::fmt;
use std::path::PathBuf;

/// Errors from a studio run.
#[derive(Debug)]
pub enum StudioError {
    /// Configuration is missing or invalid.
    Config { details: String },
    /// A file could not be read or written.
    Io { path: PathBuf, details: String },
    /// The builder API request failed.
    Api { details: String },
    /// A document did not parse.
    Parse { what: &'static str, details: String },
    /// The preview rejected the configured setup.
    Preview { details: String },
}

impl fmt::Display for StudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {details}"),
            Self::Io { path, details } => write!(f, "{}: {details}", path.display()),
            Self::Api { details } => write!(f, "builder API request failed: {details}"),
            Self::Parse { what, details } => write!(f, "invalid {what}: {details}"),
            Self::Preview { details } => write!(f, "preview setup failed: {details}"),
        }
    }
}

impl std::error::Error for StudioError {}
