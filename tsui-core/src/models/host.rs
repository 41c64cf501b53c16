//! Connections reported by the host server

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};

use super::profile::{BackendType, ConnectionProfile, ProfileDraft, ProfileSource};

/// A connection entry returned by `GET /api/v1/connections`
///
/// Every field except `url` is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConnection {
    /// Display label
    #[serde(default)]
    pub name: Option<String>,
    /// Backend flavour; blank or unrecognized values default to InfluxDB
    #[serde(rename = "type", default, deserialize_with = "lenient_backend_type")]
    pub backend_type: Option<BackendType>,
    /// Base endpoint
    pub url: String,
    /// Basic-auth username
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password
    #[serde(default)]
    pub password: Option<String>,
    /// Default database
    #[serde(default)]
    pub default_database: Option<String>,
    /// Alertmanager endpoint
    #[serde(default)]
    pub alertmanager_url: Option<String>,
    /// Alertmanager username
    #[serde(default)]
    pub alertmanager_username: Option<String>,
    /// Alertmanager password
    #[serde(default)]
    pub alertmanager_password: Option<String>,
    /// Origin reported by the host, informational only
    #[serde(default)]
    pub source: Option<String>,
}

impl HostConnection {
    /// Creates an entry for `url` with everything else unset
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Returns the trimmed URL
    #[must_use]
    pub fn trimmed_url(&self) -> &str {
        self.url.trim()
    }

    /// Converts the entry into a read-only profile with the given ID
    ///
    /// A blank name is replaced by one derived from the URL host.
    #[must_use]
    pub fn into_profile(self, id: String) -> ConnectionProfile {
        let backend_type = self.backend_type.unwrap_or_default();
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => name_from_url(&self.url, backend_type),
        };
        let mut draft = ProfileDraft::new(self.url)
            .with_name(name)
            .with_type(backend_type)
            .with_credentials(
                self.username.unwrap_or_default(),
                self.password.unwrap_or_default(),
            );
        draft.default_database = self.default_database;
        draft.alertmanager_url = self.alertmanager_url;
        draft.alertmanager_username = self.alertmanager_username;
        draft.alertmanager_password = self.alertmanager_password;
        ConnectionProfile::from_draft(id, ProfileSource::Cli, draft)
    }
}

/// Reads `type` as an optional string so an empty or unknown value does not
/// fail the whole connection list
fn lenient_backend_type<'de, D>(deserializer: D) -> Result<Option<BackendType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        if value.trim().is_empty() {
            return None;
        }
        value
            .parse()
            .map_err(|e: String| tracing::warn!(error = %e, "Ignoring host connection type"))
            .ok()
    }))
}

/// Derives a display name for a connection from its URL
///
/// Loopback hosts are labelled "local"; a URL that does not parse yields the
/// bare backend name.
#[must_use]
pub fn name_from_url(url: &str, backend_type: BackendType) -> String {
    let label = backend_type.display_name();
    let Ok(parsed) = Url::parse(url.trim()) else {
        return label.to_string();
    };
    match parsed.host_str() {
        Some("localhost" | "127.0.0.1" | "[::1]") => format!("{label} (local)"),
        Some(host) => format!("{label} ({host})"),
        None => label.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_url_local() {
        assert_eq!(
            name_from_url("http://localhost:8086", BackendType::Influxdb),
            "InfluxDB (local)"
        );
        assert_eq!(
            name_from_url("http://127.0.0.1:9090", BackendType::Prometheus),
            "Prometheus (local)"
        );
    }

    #[test]
    fn test_name_from_url_remote_and_invalid() {
        assert_eq!(
            name_from_url("https://metrics.example.com/prom", BackendType::Prometheus),
            "Prometheus (metrics.example.com)"
        );
        assert_eq!(name_from_url("not a url", BackendType::Influxdb), "InfluxDB");
    }

    #[test]
    fn test_into_profile_defaults() {
        let profile = HostConnection::new("http://influx.internal:8086").into_profile("x".into());
        assert_eq!(profile.source, ProfileSource::Cli);
        assert_eq!(profile.backend_type, BackendType::Influxdb);
        assert_eq!(profile.name, "InfluxDB (influx.internal)");
        assert!(profile.username.is_empty());
    }

    #[test]
    fn test_deserialize_minimal_entry() {
        let json = r#"[{"url":"http://a:8086"},{"name":"P","type":"prometheus","url":"http://b:9090","defaultDatabase":null}]"#;
        let list: Vec<HostConnection> = serde_json::from_str(json).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].backend_type, Some(BackendType::Prometheus));
        let profile = list[1].clone().into_profile("p".into());
        assert_eq!(profile.name, "P");
    }

    #[test]
    fn test_blank_or_unknown_type_defaults_to_influxdb() {
        let json = r#"[
            {"name":"","type":"","url":"http://a:8086","source":"cli"},
            {"name":"B","type":"influxdb","url":"http://b:8086","source":"cli"},
            {"name":"C","type":"graphite","url":"http://c:8080"}
        ]"#;
        let list: Vec<HostConnection> = serde_json::from_str(json).unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list[0].backend_type, None);
        assert_eq!(list[1].backend_type, Some(BackendType::Influxdb));
        assert_eq!(list[2].backend_type, None);
        let profile = list[0].clone().into_profile("a".into());
        assert_eq!(profile.backend_type, BackendType::Influxdb);
        assert_eq!(profile.name, "InfluxDB (a)");
    }
}
