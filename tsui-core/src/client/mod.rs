//! HTTP request client
//!
//! The core only needs a handful of calls from the HTTP layer: mode
//! detection, the host's connection list, the InfluxDB ping and the
//! Prometheus build-info probe. They are expressed by the [`BackendApi`]
//! trait so the panel and the poller can be exercised against fakes. The
//! [`CredentialSink`] trait is the narrow seam through which the
//! [`SyncDispatcher`](crate::connection::SyncDispatcher) installs the active
//! connection.
//!
//! [`RequestClient`] is the `reqwest`-backed implementation. How it routes a
//! call depends on whether a host is configured, on the detected mode and on
//! the installed remote connection:
//!
//! - standalone with a host: InfluxDB calls go to the host, which forwards
//!   them to the URL given in the `X-Influxdb-*` headers
//! - embedded: calls go to the host with basic auth
//! - no host: calls go straight to the backend with basic auth
//!
//! Prometheus calls go through `/proxy/prometheus/` whenever a host exists.

use std::fmt;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ConnectionProfile, Credentials, HostConnection};

/// Header names understood by the host server and the backends
pub mod headers {
    /// Forward target for the legacy InfluxDB proxy
    pub const INFLUXDB_URL: &str = "X-Influxdb-Url";
    /// Username for the legacy InfluxDB proxy
    pub const INFLUXDB_USERNAME: &str = "X-Influxdb-Username";
    /// Password for the legacy InfluxDB proxy
    pub const INFLUXDB_PASSWORD: &str = "X-Influxdb-Password";
    /// Version reported by InfluxDB on `/ping`
    pub const INFLUXDB_VERSION: &str = "X-Influxdb-Version";
    /// Version reported by `TideDB` on `/ping`
    pub const TIDEDB_VERSION: &str = "X-Tidedb-Version";
    /// Username forwarded by the Prometheus proxy
    pub const PROXY_USERNAME: &str = "X-Proxy-Username";
    /// Password forwarded by the Prometheus proxy
    pub const PROXY_PASSWORD: &str = "X-Proxy-Password";
}

/// Version reported when a ping response carries no version header
pub const UNKNOWN_VERSION: &str = "unknown";

const BUILD_INFO_PATH: &str = "/api/v1/status/buildinfo";

/// Errors returned by the request client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The call requires a host server but none is configured
    #[error("No host server configured")]
    NoHost,

    /// No remote connection is installed and there is no host to fall back to
    #[error("No active connection")]
    NoConnection,

    /// Transport failure (DNS, connect, timeout, TLS)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status
    #[error("Server returned HTTP {0}")]
    Status(u16),

    /// The response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Result type for request client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Body of `GET /api/mode`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeResponse {
    /// `"standalone"` or anything else for embedded
    #[serde(default)]
    pub mode: String,
    /// URL to seed an empty registry with
    #[serde(default)]
    pub default_url: Option<String>,
    /// The host forbids writes
    #[serde(default)]
    pub disable_write: bool,
    /// The host forbids administration
    #[serde(default)]
    pub disable_admin: bool,
}

/// Result of an InfluxDB ping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResponse {
    /// The server answered with a success status
    pub ok: bool,
    /// Reported version, or `"unknown"`
    pub version: String,
}

/// Body of the Prometheus build-info endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfoResponse {
    /// `"success"` when the query succeeded
    #[serde(default)]
    pub status: String,
    /// Build details
    #[serde(default)]
    pub data: Option<BuildInfoData>,
}

impl BuildInfoResponse {
    /// Returns true if the server reported success
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Returns the reported version
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.version.as_deref())
    }
}

/// Build details reported by Prometheus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfoData {
    /// Server version
    #[serde(default)]
    pub version: Option<String>,
}

/// Default remote connection installed into the request client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConnection {
    /// Backend base URL
    pub url: String,
    /// Basic-auth credentials
    pub credentials: Option<Credentials>,
}

impl RemoteConnection {
    /// Builds the remote connection for a profile
    #[must_use]
    pub fn from_profile(profile: &ConnectionProfile) -> Self {
        Self {
            url: profile.url.clone(),
            credentials: profile.credentials(),
        }
    }
}

/// Receiver of the active connection's credentials
pub trait CredentialSink: Send + Sync {
    /// Installs (or clears, with `None`) the default remote connection
    fn set_remote_connection(&self, remote: Option<RemoteConnection>);
}

/// Calls the connection core makes to the outside world
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Returns the host server base URL, if one is configured
    fn host(&self) -> Option<&str>;

    /// Returns true if a host server is configured
    fn has_host(&self) -> bool {
        self.host().is_some()
    }

    /// Switches request routing for standalone mode
    fn set_standalone_mode(&self, standalone: bool);

    /// Fetches `GET {host}/api/mode`
    ///
    /// # Errors
    ///
    /// Returns an error if there is no host or the request fails.
    async fn mode(&self) -> ApiResult<ModeResponse>;

    /// Fetches `GET {host}/api/v1/connections`
    ///
    /// A `null` body is treated as an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no host or the request fails.
    async fn host_connections(&self) -> ApiResult<Vec<HostConnection>>;

    /// Pings the installed InfluxDB connection
    ///
    /// # Errors
    ///
    /// Returns an error if there is nothing to ping, the request fails or
    /// the status is not a success.
    async fn ping(&self) -> ApiResult<PingResponse>;

    /// Fetches build info from the Prometheus server at `target`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    async fn prometheus_build_info(
        &self,
        target: &str,
        credentials: Option<&Credentials>,
    ) -> ApiResult<BuildInfoResponse>;
}

#[derive(Debug, Default)]
struct ClientState {
    standalone: bool,
    remote: Option<RemoteConnection>,
}

/// `reqwest`-backed [`BackendApi`]
pub struct RequestClient {
    http: reqwest::Client,
    host: Option<String>,
    state: RwLock<ClientState>,
}

impl RequestClient {
    /// Creates a client
    ///
    /// `host` is the base URL of the host server, if any. A blank host is
    /// treated as none.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(host: Option<&str>, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Http(e.to_string()))?;
        let host = host
            .map(|h| h.trim().trim_end_matches('/').to_string())
            .filter(|h| !h.is_empty());

        Ok(Self {
            http,
            host,
            state: RwLock::new(ClientState::default()),
        })
    }

    /// Returns true once standalone routing is enabled
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .standalone
    }

    /// Returns the installed remote connection
    #[must_use]
    pub fn remote_connection(&self) -> Option<RemoteConnection> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .remote
            .clone()
    }

    fn require_host(&self) -> ApiResult<&str> {
        self.host.as_deref().ok_or(ApiError::NoHost)
    }

    fn ping_request(&self) -> ApiResult<RequestBuilder> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let request = match (&state.remote, self.host.as_deref()) {
            (Some(remote), Some(host)) if state.standalone => {
                let mut request = self
                    .http
                    .get(endpoint(host, "/ping"))
                    .header(headers::INFLUXDB_URL, &remote.url);
                if let Some(creds) = &remote.credentials {
                    request = request
                        .header(headers::INFLUXDB_USERNAME, &creds.username)
                        .header(headers::INFLUXDB_PASSWORD, creds.password());
                }
                request
            }
            (Some(remote), _) => {
                with_basic_auth(self.http.get(endpoint(&remote.url, "/ping")), remote.credentials.as_ref())
            }
            (None, Some(host)) if !state.standalone => self.http.get(endpoint(host, "/ping")),
            (None, _) => return Err(ApiError::NoConnection),
        };
        Ok(request)
    }
}

#[async_trait]
impl BackendApi for RequestClient {
    fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    fn set_standalone_mode(&self, standalone: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .standalone = standalone;
    }

    async fn mode(&self) -> ApiResult<ModeResponse> {
        let url = endpoint(self.require_host()?, "/api/mode");
        let response = send(self.http.get(url)).await?;
        decode(response).await
    }

    async fn host_connections(&self) -> ApiResult<Vec<HostConnection>> {
        let url = endpoint(self.require_host()?, "/api/v1/connections");
        let response = send(self.http.get(url)).await?;
        let entries: Option<Vec<serde_json::Value>> = decode(response).await?;
        let list = entries
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value::<HostConnection>(entry)
                    .map_err(|e| tracing::warn!(error = %e, "Skipping malformed host connection"))
                    .ok()
            })
            .collect();
        Ok(list)
    }

    async fn ping(&self) -> ApiResult<PingResponse> {
        let response = send(self.ping_request()?).await?;
        let version = [headers::INFLUXDB_VERSION, headers::TIDEDB_VERSION]
            .iter()
            .find_map(|name| response.headers().get(*name))
            .and_then(|value| value.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(UNKNOWN_VERSION)
            .to_string();
        Ok(PingResponse { ok: true, version })
    }

    async fn prometheus_build_info(
        &self,
        target: &str,
        credentials: Option<&Credentials>,
    ) -> ApiResult<BuildInfoResponse> {
        let request = if let Some(host) = self.host.as_deref() {
            let mut request = self
                .http
                .get(endpoint(host, "/proxy/prometheus/"))
                .query(&[("target", target), ("path", BUILD_INFO_PATH)]);
            if let Some(creds) = credentials {
                request = request
                    .header(headers::PROXY_USERNAME, &creds.username)
                    .header(headers::PROXY_PASSWORD, creds.password());
            }
            request
        } else {
            with_basic_auth(self.http.get(endpoint(target, BUILD_INFO_PATH)), credentials)
        };
        let response = send(request).await?;
        decode(response).await
    }
}

impl CredentialSink for RequestClient {
    fn set_remote_connection(&self, remote: Option<RemoteConnection>) {
        tracing::debug!(
            url = remote.as_ref().map(|r| r.url.as_str()),
            "Installing remote connection"
        );
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remote = remote;
    }
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("RequestClient")
            .field("host", &self.host)
            .field("standalone", &state.standalone)
            .field("remote", &state.remote)
            .finish_non_exhaustive()
    }
}

fn endpoint(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim().trim_end_matches('/'))
}

fn with_basic_auth(request: RequestBuilder, credentials: Option<&Credentials>) -> RequestBuilder {
    match credentials {
        Some(creds) => request.basic_auth(&creds.username, Some(creds.password())),
        None => request,
    }
}

async fn send(request: RequestBuilder) -> ApiResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Http(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16()));
    }
    Ok(response)
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
