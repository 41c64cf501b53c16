//! CLI error types and exit codes.

use tsui_core::{ApiError, RegistryError, TsuiError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, storage or other
    /// non-connection errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - the backend or host could not be reached, or the
    /// named connection does not exist
    pub const CONNECTION_FAILURE: i32 = 2;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command input
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Connection not found
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// Host-supplied connections cannot be changed
    #[error("Connection '{0}' is supplied by the host and is read-only")]
    ReadOnly(String),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Health check reported the connection as unreachable
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// Request to the host or backend failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::EmptyUrl => Self::Validation(err.to_string()),
            RegistryError::NotFound(id) => Self::ConnectionNotFound(id),
            RegistryError::Storage(e) => Self::Storage(e.to_string()),
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<TsuiError> for CliError {
    fn from(err: TsuiError) -> Self {
        match err {
            TsuiError::Registry(e) => e.into(),
            TsuiError::Storage(e) => Self::Storage(e.to_string()),
            TsuiError::Config(e) => Self::Config(e.to_string()),
            TsuiError::Api(e) => e.into(),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, validation, storage, IO)
    /// - 2: Connection failure (unreachable, connection not found)
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::HealthCheckFailed(_) | Self::ConnectionNotFound(_) | Self::Connection(_) => {
                exit_codes::CONNECTION_FAILURE
            }
            Self::Config(_)
            | Self::Validation(_)
            | Self::ReadOnly(_)
            | Self::Storage(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
