//! Application settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::health::PollInterval;
use crate::tracing::TracingLevel;

/// Top-level settings stored in `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the host server; `None` talks to backends directly
    pub host_url: Option<String>,
    /// Timeout applied to every HTTP request, in seconds
    pub request_timeout_secs: u64,
    /// Health polling settings
    pub health: HealthSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host_url: None,
            request_timeout_secs: 30,
            health: HealthSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppSettings {
    /// Returns the request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Checks value ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                field: "request_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.health.interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "health.interval_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if let Some(host) = &self.host_url
            && reqwest::Url::parse(host.trim()).is_err()
        {
            return Err(ConfigError::Validation {
                field: "host_url".to_string(),
                reason: format!("'{host}' is not a valid URL"),
            });
        }
        if let Some(level) = &self.logging.level {
            level
                .parse::<TracingLevel>()
                .map_err(|reason| ConfigError::Validation {
                    field: "logging.level".to_string(),
                    reason,
                })?;
        }
        Ok(())
    }
}

/// Health polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    /// Seconds between connectivity probes
    pub interval_secs: u64,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            interval_secs: PollInterval::Connectivity.duration().as_secs(),
        }
    }
}

impl HealthSettings {
    /// Returns the polling interval
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: Option<String>,
}

impl LoggingSettings {
    /// Returns the configured level, if it parses
    #[must_use]
    pub fn tracing_level(&self) -> Option<TracingLevel> {
        self.level.as_deref().and_then(|l| l.parse().ok())
    }
}
