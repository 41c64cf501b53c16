//! Error types for `TimeseriesUI` core
//!
//! Each concern has its own error enum; [`TsuiError`] wraps them for callers
//! that orchestrate several concerns at once (the control panel, the CLI).

use std::path::PathBuf;

use thiserror::Error;

use crate::client::ApiError;
use crate::storage::StorageError;

/// Errors raised by [`ConnectionRegistry`](crate::connection::ConnectionRegistry) mutations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The URL was empty or whitespace-only
    #[error("Connection URL must not be empty")]
    EmptyUrl,

    /// No profile with the given ID exists
    #[error("Connection with ID {0} not found")]
    NotFound(String),

    /// Persisting the registry failed; the in-memory state was left untouched
    #[error("Failed to persist connections: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while loading or saving application settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not determine a configuration directory
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// Failed to parse the settings file
    #[error("Failed to parse {path}: {reason}")]
    Parse {
        /// Settings file path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Failed to serialize settings
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),

    /// A setting holds an invalid value
    #[error("Invalid value for {field}: {reason}")]
    Validation {
        /// Setting name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// IO failure while reading or writing settings
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for `TimeseriesUI` core
#[derive(Debug, Error)]
pub enum TsuiError {
    /// Registry error
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP/API error
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for operations spanning several concerns
pub type TsuiResult<T> = Result<T, TsuiError>;
