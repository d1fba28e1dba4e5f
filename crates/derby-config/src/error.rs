//! Error types for settings persistence and parsing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file does not exist yet.
    #[error("settings file not found")]
    NotFound {
        /// Location that was checked.
        path: PathBuf,
    },
    /// Field name did not match any known setting.
    #[error("unknown setting field")]
    UnknownField {
        /// Field name provided by the caller.
        value: String,
    },
    /// Settings could not be rendered as JSON.
    #[error("failed to serialize settings")]
    Serialize {
        /// Source serde error.
        source: serde_json::Error,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) const fn io(operation: &'static str, path: PathBuf, source: io::Error) -> Self {
        Self::Io {
            operation,
            path,
            source,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
