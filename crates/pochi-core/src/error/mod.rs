use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Recorder and tool-server errors with source location tracking.
#[derive(Error, Debug)]
pub enum PochiError {
    /// A referenced recording does not exist.
    #[error("File not found: {name} {location}")]
    NotFound {
        /// File name as supplied by the caller.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A caller-supplied argument is missing or unusable.
    #[error("Invalid input: {reason} {location}")]
    InvalidInput {
        /// Description of what was wrong with the input.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The destination of a rename is already taken.
    #[error("A file with name '{name}' already exists {location}")]
    Conflict {
        /// The conflicting destination file name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Filesystem operation failed.
    #[error("IO error on {path:?}: {source} {location}")]
    Io {
        /// Path involved in the failed operation, if known.
        path: Option<PathBuf>,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Status document could not be encoded.
    #[error("Status serialization failed: {reason} {location}")]
    Serialization {
        /// Description of the encoding failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Command channel could not be set up or used.
    #[error("Command channel error: {reason} {location}")]
    Channel {
        /// Description of the channel failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Directory watch could not be started.
    #[error("Directory watch error: {reason} {location}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio capture could not be started or stopped.
    #[error("Audio capture error: {reason} {location}")]
    Capture {
        /// Description of the capture failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl PochiError {
    /// Message suitable for a tool response: the error without its location.
    pub fn user_message(&self) -> String {
        match self {
            PochiError::NotFound { name, .. } => format!("File not found: {}", name),
            PochiError::InvalidInput { reason, .. } => reason.clone(),
            PochiError::Conflict { name, .. } => {
                format!("A file with name '{}' already exists.", name)
            }
            PochiError::Io { source, .. } => format!("Operation failed: {}", source),
            PochiError::Serialization { reason, .. }
            | PochiError::Channel { reason, .. }
            | PochiError::Watch { reason, .. }
            | PochiError::Capture { reason, .. } => reason.clone(),
        }
    }

    #[track_caller]
    pub(crate) fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PochiError::Io {
            path: Some(path.into()),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        PochiError::InvalidInput {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        PochiError::NotFound {
            name: name.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for PochiError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        PochiError::Io {
            path: None,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`PochiError`].
pub type Result<T> = std::result::Result<T, PochiError>;
