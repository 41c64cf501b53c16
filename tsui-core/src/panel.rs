//! Control panel startup orchestration
//!
//! [`ControlPanel::start`] runs the startup sequence once: mode detection,
//! registry load, host merge, default seeding and the initial dispatch. The
//! panel then owns the registry, so every later mutation goes through
//! `&mut` and is serialized with respect to the host merge.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::client::{BackendApi, CredentialSink};
use crate::connection::{ConnectionRegistry, SyncDispatcher};
use crate::error::TsuiResult;
use crate::health::{
    HealthEvent, HealthMonitor, HealthPollerHandle, HealthStatus, probe_profile,
    start_health_poller,
};
use crate::mode::{ModeInfo, detect_mode};
use crate::models::ConnectionProfile;
use crate::storage::KeyValueStore;

/// The running connection core
pub struct ControlPanel {
    api: Arc<dyn BackendApi>,
    dispatcher: SyncDispatcher,
    mode: ModeInfo,
    registry: Option<ConnectionRegistry>,
}

impl ControlPanel {
    /// Runs the startup sequence
    ///
    /// In standalone mode the registry is opened on `store`, host
    /// connections are merged (a failed fetch counts as none), an empty
    /// registry is seeded from the host's default URL and the active profile
    /// is dispatched. In embedded mode the registry stays closed and the host
    /// itself is dispatched as the active connection.
    ///
    /// Startup never fails: a merge or seed that cannot be persisted is
    /// logged and leaves the registry as it was loaded.
    pub async fn start<C>(client: Arc<C>, store: Arc<dyn KeyValueStore>) -> Self
    where
        C: BackendApi + CredentialSink + 'static,
    {
        let sink: Arc<dyn CredentialSink> = client.clone();
        let api: Arc<dyn BackendApi> = client;
        let dispatcher = SyncDispatcher::new(sink);
        let mode = detect_mode(api.as_ref()).await;

        if !mode.is_standalone() {
            let panel = Self {
                api,
                dispatcher,
                mode,
                registry: None,
            };
            panel.dispatch_embedded("", "");
            return panel;
        }

        let mut registry = ConnectionRegistry::open(store, dispatcher.clone());

        if api.has_host() {
            let host_connections = api.host_connections().await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to fetch host connections");
                Vec::new()
            });
            if let Err(e) = registry.merge_host_connections(&host_connections) {
                tracing::error!(error = %e, "Failed to persist host connections");
            }
        }

        let seeded = match mode.default_url.as_deref() {
            Some(url) => registry.seed_default(url).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to persist default connection");
                false
            }),
            None => false,
        };
        if !seeded {
            registry.sync();
        }

        tracing::info!(
            mode = %mode.mode,
            connections = registry.len(),
            active = registry.active_id(),
            "Control panel started"
        );

        Self {
            api,
            dispatcher,
            mode,
            registry: Some(registry),
        }
    }

    /// Returns the detected mode
    #[must_use]
    pub const fn mode(&self) -> &ModeInfo {
        &self.mode
    }

    /// Returns the registry, or `None` in embedded mode
    #[must_use]
    pub const fn registry(&self) -> Option<&ConnectionRegistry> {
        self.registry.as_ref()
    }

    /// Returns the registry for mutation, or `None` in embedded mode
    #[must_use]
    pub const fn registry_mut(&mut self) -> Option<&mut ConnectionRegistry> {
        self.registry.as_mut()
    }

    /// Returns the dispatcher of active connection changes
    #[must_use]
    pub const fn dispatcher(&self) -> &SyncDispatcher {
        &self.dispatcher
    }

    /// Returns the request API
    #[must_use]
    pub fn api(&self) -> Arc<dyn BackendApi> {
        Arc::clone(&self.api)
    }

    /// Installs credentials for the host in embedded mode
    ///
    /// The host is re-dispatched so the poller probes it again right away.
    /// Returns false, doing nothing, in standalone mode.
    pub fn apply_credentials(&self, username: &str, password: &str) -> bool {
        if self.registry.is_some() {
            return false;
        }
        self.dispatch_embedded(username, password)
    }

    /// Fetches the host's connection list again and merges it
    ///
    /// Returns the number of profiles added; always 0 in embedded mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch or the persistence fails.
    pub async fn refresh_host_connections(&mut self) -> TsuiResult<usize> {
        if self.registry.is_none() {
            return Ok(0);
        }
        let host_connections = self.api.host_connections().await?;
        match self.registry.as_mut() {
            Some(registry) => Ok(registry.merge_host_connections(&host_connections)?),
            None => Ok(0),
        }
    }

    /// Probes the active connection once
    pub async fn check_health(&self) -> HealthStatus {
        let active = self.dispatcher.current();
        let mut monitor = HealthMonitor::new();
        if let (Some(token), Some(profile)) = (monitor.begin(&active), active.profile.as_ref()) {
            let outcome = probe_profile(self.api.as_ref(), profile).await;
            monitor.apply(&token, outcome);
        }
        monitor.status().clone()
    }

    /// Starts polling the active connection every `interval`
    #[must_use]
    pub fn start_health_poller(
        &self,
        interval: Duration,
    ) -> (HealthPollerHandle, mpsc::Receiver<HealthEvent>) {
        start_health_poller(self.api(), self.dispatcher.subscribe_watch(), interval)
    }

    fn dispatch_embedded(&self, username: &str, password: &str) -> bool {
        let Some(host) = self.api.host() else {
            self.dispatcher.dispatch_profile(None);
            return false;
        };
        let profile = ConnectionProfile::embedded_host(host, username, password);
        self.dispatcher.dispatch_profile(Some(&profile));
        true
    }
}

impl std::fmt::Debug for ControlPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPanel")
            .field("mode", &self.mode)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
