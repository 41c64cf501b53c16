//! Standalone/embedded mode detection
//!
//! The panel asks the host once at startup which mode it runs in. Only an
//! explicit `"standalone"` answer enables the connection registry; every
//! other outcome, including transport failures, means embedded.

use std::fmt;

use tracing::Instrument;

use crate::client::BackendApi;
use crate::tracing::span_names;

/// Operating mode of the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiMode {
    /// The panel manages its own connection registry
    Standalone,
    /// The panel talks to the host it is served from
    Embedded,
}

impl fmt::Display for UiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standalone => f.write_str("standalone"),
            Self::Embedded => f.write_str("embedded"),
        }
    }
}

/// Outcome of mode detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeInfo {
    /// Detected mode
    pub mode: UiMode,
    /// URL the host suggests for seeding an empty registry
    pub default_url: Option<String>,
    /// Write views are available
    pub write_enabled: bool,
    /// Admin views are available
    pub admin_enabled: bool,
}

impl ModeInfo {
    /// Mode used when no host is configured: a standalone registry with no
    /// suggested default
    #[must_use]
    pub const fn local() -> Self {
        Self {
            mode: UiMode::Standalone,
            default_url: None,
            write_enabled: true,
            admin_enabled: true,
        }
    }

    /// Mode used whenever the host does not report standalone
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            mode: UiMode::Embedded,
            default_url: None,
            write_enabled: true,
            admin_enabled: true,
        }
    }

    /// Returns true in standalone mode
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.mode == UiMode::Standalone
    }
}

/// Detects the operating mode
///
/// On a standalone answer the client is switched to standalone routing.
/// Failures are logged and reported as embedded, never as errors.
pub async fn detect_mode(api: &dyn BackendApi) -> ModeInfo {
    if !api.has_host() {
        tracing::debug!("No host configured, using local standalone mode");
        return ModeInfo::local();
    }

    let response = api
        .mode()
        .instrument(crate::trace_operation!(span_names::MODE_DETECT))
        .await;
    match response {
        Ok(response) if response.mode == "standalone" => {
            api.set_standalone_mode(true);
            let info = ModeInfo {
                mode: UiMode::Standalone,
                default_url: response.default_url.filter(|u| !u.trim().is_empty()),
                write_enabled: !response.disable_write,
                admin_enabled: !response.disable_admin,
            };
            tracing::info!(default_url = info.default_url.as_deref(), "Running in standalone mode");
            info
        }
        Ok(response) => {
            tracing::info!(mode = %response.mode, "Running in embedded mode");
            ModeInfo::embedded()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Mode detection failed, assuming embedded mode");
            ModeInfo::embedded()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::RequestClient;

    fn client(host: Option<&str>) -> RequestClient {
        RequestClient::new(host, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_standalone_switches_client_routing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/mode")
            .with_status(200)
            .with_body(r#"{"mode":"standalone","defaultUrl":"http://localhost:8086","disableAdmin":true}"#)
            .create_async()
            .await;
        let client = client(Some(&server.url()));

        let info = detect_mode(&client).await;

        assert_eq!(info.mode, UiMode::Standalone);
        assert_eq!(info.default_url.as_deref(), Some("http://localhost:8086"));
        assert!(info.write_enabled);
        assert!(!info.admin_enabled);
        assert!(client.is_standalone());
    }

    #[tokio::test]
    async fn test_other_mode_is_embedded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/mode")
            .with_status(200)
            .with_body(r#"{"mode":"server"}"#)
            .create_async()
            .await;
        let client = client(Some(&server.url()));

        assert_eq!(detect_mode(&client).await, ModeInfo::embedded());
        assert!(!client.is_standalone());
    }

    #[tokio::test]
    async fn test_failure_is_embedded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/mode")
            .with_status(404)
            .create_async()
            .await;

        let info = detect_mode(&client(Some(&server.url()))).await;
        assert_eq!(info.mode, UiMode::Embedded);
    }

    #[tokio::test]
    async fn test_no_host_is_local_standalone() {
        let info = detect_mode(&client(None)).await;
        assert_eq!(info, ModeInfo::local());
        assert!(info.is_standalone());
    }
}
