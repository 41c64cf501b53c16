//! Shared utility functions used across command modules.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;
use tsui_core::{
    AppSettings, ConfigManager, ConnectionProfile, ConnectionRegistry, ControlPanel,
    KeyValueStore, RequestClient, TracingLevel,
};

use crate::cli::GlobalArgs;
use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Log level from `config.toml`, or the default when it cannot be read
pub fn configured_log_level(config_path: Option<&Path>) -> TracingLevel {
    create_config_manager(config_path)
        .ok()
        .and_then(|manager| manager.load_settings().ok())
        .and_then(|settings| settings.logging.tracing_level())
        .unwrap_or_default()
}

/// Creates the async runtime for commands that talk to the network
pub fn create_runtime() -> Result<Runtime, CliError> {
    Runtime::new()
        .map_err(|e| CliError::Config(format!("Failed to create async runtime: {e}")))
}

/// Loaded configuration for one command invocation
pub struct Session {
    /// Configuration directory handle
    pub config_manager: ConfigManager,
    /// Settings from `config.toml`
    pub settings: AppSettings,
    /// Host URL after applying the `--host` override
    pub host: Option<String>,
}

impl Session {
    /// Loads settings and resolves the host
    pub fn load(globals: &GlobalArgs) -> Result<Self, CliError> {
        let config_manager = create_config_manager(globals.config_path.as_deref())?;
        let settings = config_manager
            .load_settings()
            .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;
        let host = globals
            .host
            .clone()
            .or_else(|| settings.host_url.clone())
            .filter(|h| !h.trim().is_empty());
        tracing::debug!(host = host.as_deref(), "Session loaded");
        Ok(Self {
            config_manager,
            settings,
            host,
        })
    }

    /// Builds the request client for the resolved host
    pub fn client(&self) -> Result<Arc<RequestClient>, CliError> {
        let client = RequestClient::new(self.host.as_deref(), self.settings.request_timeout())?;
        Ok(Arc::new(client))
    }

    /// Opens the persistent connection store
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, CliError> {
        let store = self
            .config_manager
            .open_store()
            .map_err(|e| CliError::Storage(format!("Failed to open connection store: {e}")))?;
        Ok(Arc::new(store))
    }

    /// Starts the control panel: mode detection, host merge and first sync
    pub fn open_panel(&self, runtime: &Runtime) -> Result<ControlPanel, CliError> {
        self.start_panel(runtime, self.open_store()?)
    }

    /// Starts the control panel on an already opened store
    pub fn start_panel(
        &self,
        runtime: &Runtime,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<ControlPanel, CliError> {
        let client = self.client()?;
        Ok(runtime.block_on(ControlPanel::start(client, store)))
    }
}

/// Returns the registry, or an error when the host runs in embedded mode
pub fn require_registry(panel: &ControlPanel) -> Result<&ConnectionRegistry, CliError> {
    panel.registry().ok_or_else(embedded_error)
}

/// Mutable variant of [`require_registry`]
pub fn require_registry_mut(panel: &mut ControlPanel) -> Result<&mut ConnectionRegistry, CliError> {
    panel.registry_mut().ok_or_else(embedded_error)
}

fn embedded_error() -> CliError {
    CliError::Config(
        "The host runs in embedded mode; connections are managed by the host".to_string(),
    )
}

/// Find a connection by name or ID
///
/// Tries the exact name, the ID, a case-insensitive name and finally a unique
/// name or ID prefix.
pub fn find_profile<'a>(
    registry: &'a ConnectionRegistry,
    name_or_id: &str,
) -> Result<&'a ConnectionProfile, CliError> {
    if let Some(profile) = registry.find(name_or_id) {
        return Ok(profile);
    }

    let matches = registry.prefix_matches(name_or_id);
    if matches.len() > 1 {
        let names: Vec<_> = matches.iter().map(|p| p.name.as_str()).collect();
        return Err(CliError::Config(format!(
            "Ambiguous connection name '{}'. Matches: {}",
            name_or_id,
            names.join(", ")
        )));
    }
    Err(CliError::ConnectionNotFound(name_or_id.to_string()))
}

/// Masks a secret for display
pub fn mask(secret: &str) -> &'static str {
    if secret.is_empty() { "(none)" } else { "********" }
}
