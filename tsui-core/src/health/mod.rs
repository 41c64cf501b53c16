//! Health of the active connection
//!
//! Provides the probe run against a single profile, the [`HealthMonitor`]
//! state machine that decides which probe results are still relevant, and a
//! periodic poller driving both from the active connection watch channel.
//!
//! This module is presentation-free; front-ends consume [`HealthEvent`]s.

mod poller;

pub use poller::{HealthEvent, HealthPollerHandle, start_health_poller};

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::Instrument;

use crate::client::{BackendApi, UNKNOWN_VERSION};
use crate::connection::ActiveConnection;
use crate::models::{BackendType, ConnectionProfile};
use crate::tracing::span_names;

/// Fixed polling cadences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollInterval {
    /// Connectivity indicator, every 10 seconds
    Connectivity,
    /// Admin metrics view, every 5 seconds
    AdminMetrics,
}

impl PollInterval {
    /// Returns the interval length
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::Connectivity => Duration::from_secs(10),
            Self::AdminMetrics => Duration::from_secs(5),
        }
    }
}

/// Connectivity state of the active connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HealthState {
    /// Nothing has been probed yet
    #[default]
    Idle,
    /// A probe for the current connection is in flight
    Polling,
    /// The last probe succeeded
    Connected,
    /// The last probe failed, or there is no active connection
    Disconnected,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Polling => f.write_str("polling"),
            Self::Connected => f.write_str("connected"),
            Self::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Health snapshot reported to front-ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthStatus {
    /// Current state
    pub state: HealthState,
    /// Server version reported by the last successful probe
    pub version: Option<String>,
    /// Profile the status refers to
    pub profile_id: Option<String>,
    /// When the state last settled
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthStatus {
    /// Compares everything but the timestamp
    #[must_use]
    pub fn same_state(&self, other: &Self) -> bool {
        self.state == other.state
            && self.version == other.version
            && self.profile_id == other.profile_id
    }

    /// Returns true if the last probe succeeded
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == HealthState::Connected
    }
}

/// Identifies the active snapshot a probe was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeToken {
    /// Dispatcher generation at issue time
    pub generation: u64,
    /// Probed profile
    pub profile_id: String,
}

/// Result of probing one profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// The backend answered successfully
    pub connected: bool,
    /// Reported version, if known
    pub version: Option<String>,
}

impl ProbeOutcome {
    /// A failed probe
    #[must_use]
    pub const fn disconnected() -> Self {
        Self {
            connected: false,
            version: None,
        }
    }
}

/// Tracks the health of the active connection and rejects stale results
#[derive(Debug, Default)]
pub struct HealthMonitor {
    status: HealthStatus,
    generation: u64,
}

impl HealthMonitor {
    /// Creates a monitor in the `Idle` state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current status
    #[must_use]
    pub const fn status(&self) -> &HealthStatus {
        &self.status
    }

    /// Starts a probe round for `active`
    ///
    /// With no active profile the status becomes `Disconnected` right away
    /// and no token is returned, so no network call is made. Otherwise the
    /// status enters `Polling` when the profile differs from the one last
    /// reported (a periodic re-probe of the same profile keeps the settled
    /// state visible) and a token for the probe is returned.
    pub fn begin(&mut self, active: &ActiveConnection) -> Option<ProbeToken> {
        self.generation = active.generation;

        let Some(profile) = &active.profile else {
            self.status = HealthStatus {
                state: HealthState::Disconnected,
                version: None,
                profile_id: None,
                checked_at: Some(Utc::now()),
            };
            return None;
        };

        let same_profile = self.status.profile_id.as_deref() == Some(profile.id.as_str());
        let settled = matches!(
            self.status.state,
            HealthState::Connected | HealthState::Disconnected
        );
        if !(same_profile && settled) {
            self.status = HealthStatus {
                state: HealthState::Polling,
                version: None,
                profile_id: Some(profile.id.clone()),
                checked_at: None,
            };
        }

        Some(ProbeToken {
            generation: active.generation,
            profile_id: profile.id.clone(),
        })
    }

    /// Applies a probe result
    ///
    /// Returns false, leaving the status untouched, when the token was
    /// issued for an earlier active snapshot.
    pub fn apply(&mut self, token: &ProbeToken, outcome: ProbeOutcome) -> bool {
        let current = token.generation == self.generation
            && self.status.profile_id.as_deref() == Some(token.profile_id.as_str());
        if !current {
            tracing::debug!(
                generation = token.generation,
                profile_id = %token.profile_id,
                "Discarding stale probe result"
            );
            return false;
        }

        self.status.state = if outcome.connected {
            HealthState::Connected
        } else {
            HealthState::Disconnected
        };
        self.status.version = outcome.version.filter(|_| outcome.connected);
        self.status.checked_at = Some(Utc::now());
        true
    }
}

/// Probes a single profile
///
/// InfluxDB profiles are pinged through the client's installed remote
/// connection; Prometheus profiles are asked for their build info. Any
/// failure is reported as disconnected.
pub async fn probe_profile(api: &dyn BackendApi, profile: &ConnectionProfile) -> ProbeOutcome {
    let span = crate::trace_operation!(
        span_names::HEALTH_PROBE,
        profile_id = %profile.id,
        backend_type = %profile.backend_type
    );
    probe(api, profile).instrument(span).await
}

async fn probe(api: &dyn BackendApi, profile: &ConnectionProfile) -> ProbeOutcome {
    match profile.backend_type {
        BackendType::Influxdb => match api.ping().await {
            Ok(ping) if ping.ok => ProbeOutcome {
                connected: true,
                version: (ping.version != UNKNOWN_VERSION).then_some(ping.version),
            },
            Ok(_) => ProbeOutcome::disconnected(),
            Err(e) => {
                tracing::debug!(profile_id = %profile.id, error = %e, "Ping failed");
                ProbeOutcome::disconnected()
            }
        },
        BackendType::Prometheus => {
            let credentials = profile.credentials();
            match api
                .prometheus_build_info(&profile.url, credentials.as_ref())
                .await
            {
                Ok(info) if info.is_success() => ProbeOutcome {
                    connected: true,
                    version: info.version().map(str::to_string),
                },
                Ok(info) => {
                    tracing::debug!(profile_id = %profile.id, status = %info.status, "Build info not successful");
                    ProbeOutcome::disconnected()
                }
                Err(e) => {
                    tracing::debug!(profile_id = %profile.id, error = %e, "Build info probe failed");
                    ProbeOutcome::disconnected()
                }
            }
        }
    }
}
