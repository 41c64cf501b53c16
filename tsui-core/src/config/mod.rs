//! Configuration management for `TimeseriesUI`
//!
//! This module provides the `ConfigManager` for loading and saving the
//! application settings file (`config.toml`) and for locating the storage
//! file backing the connection registry.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager};
pub use settings::{AppSettings, HealthSettings, LoggingSettings};
