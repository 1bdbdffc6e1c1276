//! Error types for babysteps.
//!
//! This module defines every error the store can produce. Most of them never
//! reach application code: the [`Store`](crate::store::Store) façade absorbs and
//! logs them, and only the `try_*` operations hand them back to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for babysteps operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Environment Errors ===
    /// Persistent storage is not available on this platform.
    #[error("persistent storage unavailable: {reason}")]
    EnvironmentUnsupported {
        /// Why storage could not be provided.
        reason: String,
    },

    // === Codec Errors ===
    /// The obfuscation codec could not encode a text blob.
    #[error("failed to encode record: {message}")]
    Encode {
        /// Description of what went wrong.
        message: String,
    },

    /// The obfuscation codec could not decode a stored record.
    #[error("failed to decode record: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },

    /// A decoded record is not a usable snapshot document.
    #[error("failed to deserialize snapshot: {0}")]
    Deserialize(#[source] serde_json::Error),

    // === Backend Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A blocking backend task panicked or was cancelled.
    #[error("backend task failed: {0}")]
    BackendTask(#[from] tokio::task::JoinError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Advice Errors ===
    /// The advice service could not produce a reply.
    #[error("advice service unavailable: {0}")]
    AdvisorUnavailable(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed outside of snapshot decoding.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for babysteps operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new environment-unsupported error.
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::EnvironmentUnsupported {
            reason: reason.into(),
        }
    }

    /// Create a new encode error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a new decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if persistent storage is unavailable.
    #[must_use]
    pub fn is_environment_unsupported(&self) -> bool {
        matches!(self, Self::EnvironmentUnsupported { .. })
    }

    /// Check if this error came from the obfuscation or snapshot layers.
    #[must_use]
    pub fn is_codec_failure(&self) -> bool {
        matches!(
            self,
            Self::Encode { .. } | Self::Decode { .. } | Self::Deserialize(_)
        )
    }

    /// Check if the storage call itself failed.
    #[must_use]
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::BackendTask(_)
                | Self::Io(_)
                | Self::DirectoryCreate { .. }
        )
    }
}
