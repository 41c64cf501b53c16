//! `TimeseriesUI` Core Library
//!
//! This crate provides the connection core behind the `TimeseriesUI` control
//! panel: the registry of backend connection profiles, its persistence, the
//! synchronization of the active connection to the request client, mode
//! detection and health polling.
//!
//! # Crate Structure
//!
//! - [`models`] - Connection profiles, drafts and host-supplied connections
//! - [`storage`] - Key/value persistence (`MemoryStore`, `FileStore`)
//! - [`connection`] - `ConnectionRegistry` and `SyncDispatcher`
//! - [`client`] - HTTP request client and the `BackendApi` seam
//! - [`mode`] - Standalone/embedded mode detection
//! - [`health`] - Health probes and the periodic poller
//! - [`panel`] - Startup orchestration (`ControlPanel`)
//! - [`config`] - Application settings and their persistence
//! - [`tracing`] - Structured logging setup

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod health;
pub mod mode;
pub mod models;
pub mod panel;
pub mod storage;
pub mod tracing;

pub use client::{
    ApiError, ApiResult, BackendApi, BuildInfoResponse, CredentialSink, ModeResponse,
    PingResponse, RemoteConnection, RequestClient,
};
pub use config::{AppSettings, ConfigManager, HealthSettings, LoggingSettings};
pub use connection::{
    ActiveConnection, ConnectionRegistry, MutationOutcome, Subscription, SyncDispatcher,
};
pub use error::{ConfigError, ConfigResult, RegistryError, RegistryResult, TsuiError, TsuiResult};
pub use health::{
    HealthEvent, HealthMonitor, HealthPollerHandle, HealthState, HealthStatus, PollInterval,
    ProbeOutcome, ProbeToken, probe_profile, start_health_poller,
};
pub use mode::{ModeInfo, UiMode, detect_mode};
pub use models::{
    BackendType, ConnectionProfile, Credentials, HostConnection, ProfileDraft, ProfileSource,
    name_from_url,
};
pub use panel::ControlPanel;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, TracingResult, init_tracing,
    is_tracing_initialized,
};
