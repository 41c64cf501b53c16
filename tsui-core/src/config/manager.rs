//! Configuration file management

use std::path::{Path, PathBuf};

use super::settings::AppSettings;
use crate::error::{ConfigError, ConfigResult};
use crate::storage::{FileStore, StorageResult};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "TSUI_CONFIG_DIR";

const SETTINGS_FILE: &str = "config.toml";
const STORAGE_FILE: &str = "storage.json";

/// Locates and reads/writes the files in the configuration directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default configuration directory
    ///
    /// Uses `TSUI_CONFIG_DIR` when set, otherwise `tsui` under the platform
    /// configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if no directory can be determined.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("tsui");
        Ok(Self { config_dir })
    }

    /// Creates a manager for an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the settings file path
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Returns the connection storage file path
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.config_dir.join(STORAGE_FILE)
    }

    /// Opens the connection storage file
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open_store(&self) -> StorageResult<FileStore> {
        FileStore::open(self.storage_path())
    }

    /// Loads settings; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let path = self.settings_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(AppSettings::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        let settings: AppSettings = toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Saves settings, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::write(self.settings_path(), content)?;
        Ok(())
    }
}
