//! Connection profile model

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Name given to a profile saved with a blank name
pub const UNTITLED_PROFILE_NAME: &str = "Untitled";

/// Name of the profile seeded from the host's default URL
pub const DEFAULT_PROFILE_NAME: &str = "Default";

/// ID of the implicit, never persisted profile used in embedded mode
pub const EMBEDDED_PROFILE_ID: &str = "embedded";

/// Backend flavour of a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// InfluxDB 1.x compatible server, reached directly
    #[default]
    Influxdb,
    /// Prometheus compatible server, reached through the host proxy
    Prometheus,
}

impl BackendType {
    /// Returns the identifier used on the wire and in storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Influxdb => "influxdb",
            Self::Prometheus => "prometheus",
        }
    }

    /// Returns the human readable product name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Influxdb => "InfluxDB",
            Self::Prometheus => "Prometheus",
        }
    }
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "influxdb" | "influx" => Ok(Self::Influxdb),
            "prometheus" | "prom" => Ok(Self::Prometheus),
            other => Err(format!("unknown backend type '{other}'")),
        }
    }
}

/// Where a profile came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSource {
    /// Entered by the operator; editable and removable
    #[default]
    Browser,
    /// Supplied by the host server's startup configuration; read-only
    Cli,
}

impl ProfileSource {
    /// Returns true for profiles the operator may edit or remove
    #[must_use]
    pub const fn is_user_managed(self) -> bool {
        matches!(self, Self::Browser)
    }
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser => f.write_str("browser"),
            Self::Cli => f.write_str("cli"),
        }
    }
}

/// A named set of backend-access parameters
///
/// Serialized in camelCase so the stored list stays readable by older
/// versions of the panel. Fields other than `id` and `url` default when
/// missing, which backfills `type` and `source` for profiles written by
/// earlier schemas.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProfile {
    /// Opaque unique identifier
    pub id: String,
    /// Display label
    #[serde(default)]
    pub name: String,
    /// Backend flavour
    #[serde(rename = "type", default)]
    pub backend_type: BackendType,
    /// Base endpoint of the backend
    pub url: String,
    /// Basic-auth username, empty when unused
    #[serde(default)]
    pub username: String,
    /// Basic-auth password, empty when unused
    #[serde(default)]
    pub password: String,
    /// Database selected by default in query views
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_database: Option<String>,
    /// Alertmanager endpoint (Prometheus only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertmanager_url: Option<String>,
    /// Alertmanager basic-auth username (Prometheus only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertmanager_username: Option<String>,
    /// Alertmanager basic-auth password (Prometheus only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertmanager_password: Option<String>,
    /// Origin of the profile
    #[serde(default)]
    pub source: ProfileSource,
}

impl ConnectionProfile {
    /// Builds a profile from a validated draft
    #[must_use]
    pub fn from_draft(id: String, source: ProfileSource, draft: ProfileDraft) -> Self {
        let mut profile = Self {
            id,
            name: String::new(),
            backend_type: BackendType::default(),
            url: String::new(),
            username: String::new(),
            password: String::new(),
            default_database: None,
            alertmanager_url: None,
            alertmanager_username: None,
            alertmanager_password: None,
            source,
        };
        profile.apply_draft(draft);
        profile
    }

    /// Implicit profile pointing at the host itself, used in embedded mode
    #[must_use]
    pub fn embedded_host(host_url: &str, username: &str, password: &str) -> Self {
        Self::from_draft(
            EMBEDDED_PROFILE_ID.to_string(),
            ProfileSource::Cli,
            ProfileDraft::new(host_url)
                .with_name("Host")
                .with_credentials(username, password),
        )
    }

    /// Replaces the editable fields with the draft's values
    pub fn apply_draft(&mut self, draft: ProfileDraft) {
        let draft = draft.normalized();
        self.name = draft.name;
        self.backend_type = draft.backend_type;
        self.url = draft.url;
        self.username = draft.username;
        self.password = draft.password;
        self.default_database = draft.default_database;
        self.alertmanager_url = draft.alertmanager_url;
        self.alertmanager_username = draft.alertmanager_username;
        self.alertmanager_password = draft.alertmanager_password;
    }

    /// Returns true if the operator may edit or remove this profile
    #[must_use]
    pub const fn is_user_managed(&self) -> bool {
        self.source.is_user_managed()
    }

    /// Basic-auth credentials for the backend, if a username is set
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(&self.username, &self.password)
    }

    /// Basic-auth credentials for the Alertmanager, if a username is set
    #[must_use]
    pub fn alertmanager_credentials(&self) -> Option<Credentials> {
        let username = self.alertmanager_username.as_deref()?;
        Credentials::from_parts(username, self.alertmanager_password.as_deref().unwrap_or(""))
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type", &self.backend_type)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("default_database", &self.default_database)
            .field("alertmanager_url", &self.alertmanager_url)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Fields entered by the operator when adding or editing a profile
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    /// Display label; blank becomes "Untitled"
    pub name: String,
    /// Backend flavour
    pub backend_type: BackendType,
    /// Base endpoint; must be non-empty after trimming
    pub url: String,
    /// Basic-auth username
    pub username: String,
    /// Basic-auth password
    pub password: String,
    /// Default database
    pub default_database: Option<String>,
    /// Alertmanager endpoint
    pub alertmanager_url: Option<String>,
    /// Alertmanager username
    pub alertmanager_username: Option<String>,
    /// Alertmanager password
    pub alertmanager_password: Option<String>,
}

impl ProfileDraft {
    /// Creates a draft for an InfluxDB backend at `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the backend type
    #[must_use]
    pub const fn with_type(mut self, backend_type: BackendType) -> Self {
        self.backend_type = backend_type;
        self
    }

    /// Sets basic-auth credentials
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the default database
    #[must_use]
    pub fn with_default_database(mut self, database: impl Into<String>) -> Self {
        self.default_database = Some(database.into());
        self
    }

    /// Sets the Alertmanager endpoint and optional credentials
    #[must_use]
    pub fn with_alertmanager(
        mut self,
        url: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.alertmanager_url = Some(url.into());
        self.alertmanager_username = username;
        self.alertmanager_password = password;
        self
    }

    /// Returns the trimmed URL, or `None` if it is blank
    #[must_use]
    pub fn validated_url(&self) -> Option<&str> {
        let url = self.url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// Trims name and URL, applies the "Untitled" default and drops
    /// Alertmanager fields that only apply to Prometheus
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let name = self.name.trim();
        self.name = if name.is_empty() {
            UNTITLED_PROFILE_NAME.to_string()
        } else {
            name.to_string()
        };
        self.url = self.url.trim().to_string();
        self.default_database = non_blank(self.default_database);
        if self.backend_type == BackendType::Prometheus {
            self.alertmanager_url = non_blank(self.alertmanager_url).map(|u| u.trim().to_string());
            self.alertmanager_username = non_blank(self.alertmanager_username);
            self.alertmanager_password = non_blank(self.alertmanager_password);
        } else {
            self.alertmanager_url = None;
            self.alertmanager_username = None;
            self.alertmanager_password = None;
        }
        self
    }
}

impl fmt::Debug for ProfileDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileDraft")
            .field("name", &self.name)
            .field("type", &self.backend_type)
            .field("url", &self.url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl From<&ConnectionProfile> for ProfileDraft {
    /// Draft pre-filled with a profile's current values, for partial edits
    fn from(profile: &ConnectionProfile) -> Self {
        Self {
            name: profile.name.clone(),
            backend_type: profile.backend_type,
            url: profile.url.clone(),
            username: profile.username.clone(),
            password: profile.password.clone(),
            default_database: profile.default_database.clone(),
            alertmanager_url: profile.alertmanager_url.clone(),
            alertmanager_username: profile.alertmanager_username.clone(),
            alertmanager_password: profile.alertmanager_password.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Basic-auth credentials held in memory by the request client
pub struct Credentials {
    /// Username
    pub username: String,
    /// Password
    pub password: SecretString,
}

impl Credentials {
    /// Creates credentials
    #[must_use]
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.to_string()),
        }
    }

    /// Returns credentials only if `username` is non-empty
    #[must_use]
    pub fn from_parts(username: &str, password: &str) -> Option<Self> {
        (!username.is_empty()).then(|| Self::new(username, password))
    }

    /// Returns the password in clear text for request construction
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl Clone for Credentials {
    fn clone(&self) -> Self {
        Self::new(self.username.clone(), self.password())
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.username == other.username && self.password() == other.password()
    }
}

impl Eq for Credentials {}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
