//! Key/value persistence for the connection registry
//!
//! The registry mirrors its state into a [`KeyValueStore`] after every
//! mutation. Two implementations are provided:
//!
//! - [`MemoryStore`] - process-local, used by tests and embedders
//! - [`FileStore`] - a JSON object file written atomically via rename

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Key holding the serialized connection list
pub const CONNECTIONS_KEY: &str = "timeseriesui_connections";

/// Key holding the active connection ID
pub const ACTIVE_CONNECTION_KEY: &str = "timeseriesui_active_connection";

/// Keys read, in priority order, when loading the connection list
pub const CONNECTIONS_READ_KEYS: [&str; 2] = [CONNECTIONS_KEY, "tidedb-connections"];

/// Keys read, in priority order, when loading the active connection ID
pub const ACTIVE_CONNECTION_READ_KEYS: [&str; 2] =
    [ACTIVE_CONNECTION_KEY, "tidedb-active-connection"];

/// Errors raised by a [`KeyValueStore`]
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO failure on the backing file
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store contents could not be serialized
    #[error("Failed to serialize storage: {0}")]
    Serialize(String),

    /// The store refused the write
    #[error("Storage is unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string key/value store
///
/// Reads never fail: an unreadable value is reported as absent.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be made durable.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Removes `key`; removing an absent key succeeds
    ///
    /// # Errors
    ///
    /// Returns an error if the removal could not be made durable.
    fn remove(&self, key: &str) -> StorageResult<()>;
}
