//! Error types for pgdrop
//!
//! All modules use `DropResult<T>` as their return type.

use crate::buffers::DatabaseId;
use crate::exec::ExitOutcome;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pgdrop operations
pub type DropResult<T> = Result<T, DropError>;

/// Coarse classification of a [`DropError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The execution context could not be created; nothing was attempted
    Environment,
    /// An external command or host primitive ran and did not succeed
    OperationFailed,
    /// Configuration could not be read or written
    Config,
    /// Local IO outside the drop operations (audit, config dirs)
    Io,
    /// Everything else
    Internal,
}

/// All errors that can occur in pgdrop
#[derive(Error, Debug)]
pub enum DropError {
    // Execution context errors
    #[error("Failed to fork process to drop system cache: {command}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Operation errors
    #[error("Dropping system cache failed with {outcome}")]
    SystemCacheDrop {
        /// Elevated command line, without the privilege wrapper
        command: String,
        outcome: ExitOutcome,
    },

    #[error("Failed to flush buffers for database {database}: {reason}")]
    FlushFailed { database: DatabaseId, reason: String },

    #[error("Failed to drop buffers for database {database}: {reason}")]
    EvictFailed { database: DatabaseId, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // General errors
    #[error("Declined: nothing was dropped")]
    Declined,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl DropError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a spawn failure for a command line
    pub fn spawn_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpawnFailed {
            command: command.into(),
            source,
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SpawnFailed { .. } => ErrorKind::Environment,
            Self::SystemCacheDrop { .. } | Self::FlushFailed { .. } | Self::EvictFailed { .. } => {
                ErrorKind::OperationFailed
            }
            Self::ConfigInvalid { .. } | Self::ConfigDirCreate { .. } | Self::TomlSerialize(_) => {
                ErrorKind::Config
            }
            Self::Io { .. } => ErrorKind::Io,
            Self::Declined | Self::Internal(_) | Self::User(_) => ErrorKind::Internal,
        }
    }

    /// Machine-readable SQLSTATE-style error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::SpawnFailed { .. } | Self::SystemCacheDrop { .. } => "58000",
            Self::FlushFailed { .. } | Self::EvictFailed { .. } | Self::Io { .. } => "58030",
            Self::ConfigInvalid { .. } | Self::ConfigDirCreate { .. } | Self::TomlSerialize(_) => {
                "F0000"
            }
            Self::Declined => "57014",
            Self::Internal(_) => "XX000",
            Self::User(_) => "P0001",
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::SystemCacheDrop { command, .. } => Some(format!(
                "Ensure the invoking user has sudo permissions for `{}`",
                command
            )),
            Self::SpawnFailed { .. } => {
                Some("Check the process limit (ulimit -u) and available memory".to_string())
            }
            Self::ConfigInvalid { .. } => Some("Run: pgdrop config init --force".to_string()),
            Self::Declined => Some("Pass --yes to skip confirmation".to_string()),
            _ => None,
        }
    }
}
