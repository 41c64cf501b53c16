//! Control panel startup against a mock host server

use std::sync::Arc;
use std::time::Duration;

use tsui_core::{
    ControlPanel, FileStore, HealthEvent, HealthState, KeyValueStore, ProfileSource, RequestClient,
    UiMode,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn client(host: &str) -> Arc<RequestClient> {
    Arc::new(RequestClient::new(Some(host), TIMEOUT).expect("client"))
}

async fn mock_standalone_host(server: &mut mockito::ServerGuard, connections: &str) {
    server
        .mock("GET", "/api/mode")
        .with_status(200)
        .with_body(r#"{"mode":"standalone","defaultUrl":"http://localhost:8086"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/connections")
        .with_status(200)
        .with_body(connections)
        .create_async()
        .await;
}

#[tokio::test]
async fn standalone_startup_merges_and_persists() {
    let mut server = mockito::Server::new_async().await;
    mock_standalone_host(
        &mut server,
        r#"[{"name":"Metrics","type":"prometheus","url":"http://prom:9090"}]"#,
    )
    .await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
        let panel = ControlPanel::start(client(&server.url()), store).await;

        assert_eq!(panel.mode().mode, UiMode::Standalone);
        let registry = panel.registry().expect("registry in standalone mode");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.profiles()[0].source, ProfileSource::Cli);
        assert_eq!(registry.profiles()[0].name, "Metrics");
    }

    // A second start must not duplicate the host connection
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
    let panel = ControlPanel::start(client(&server.url()), store).await;
    assert_eq!(panel.registry().unwrap().len(), 1);
}

#[tokio::test]
async fn null_host_connections_seed_default() {
    let mut server = mockito::Server::new_async().await;
    mock_standalone_host(&mut server, "null").await;
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::open(dir.path().join("storage.json")).unwrap());

    let client = client(&server.url());
    let panel = ControlPanel::start(client.clone(), store).await;

    let active = panel.registry().unwrap().active().expect("seeded");
    assert_eq!(active.name, "Default");
    assert_eq!(
        client.remote_connection().map(|r| r.url),
        Some("http://localhost:8086".to_string())
    );
}

#[tokio::test]
async fn embedded_poller_pings_host_with_credentials() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/mode")
        .with_status(200)
        .with_body(r#"{"mode":"server"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/ping")
        .match_header("authorization", "Basic YWRtaW46cHc=")
        .with_status(204)
        .with_header("X-Tidedb-Version", "0.9.1")
        .create_async()
        .await;
    server
        .mock("GET", "/ping")
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(401)
        .create_async()
        .await;

    let store: Arc<dyn KeyValueStore> = Arc::new(tsui_core::MemoryStore::new());
    let panel = ControlPanel::start(client(&server.url()), store).await;
    assert!(panel.registry().is_none());

    let (handle, mut events) = panel.start_health_poller(Duration::from_secs(60));
    let disconnected = wait_for(&mut events, HealthState::Disconnected).await;
    assert_eq!(disconnected.profile_id.as_deref(), Some("embedded"));

    assert!(panel.apply_credentials("admin", "pw"));
    let connected = wait_for(&mut events, HealthState::Connected).await;
    assert_eq!(connected.version.as_deref(), Some("0.9.1"));

    handle.stop().await;
}

async fn wait_for(
    events: &mut tokio::sync::mpsc::Receiver<HealthEvent>,
    state: HealthState,
) -> tsui_core::HealthStatus {
    loop {
        let event = tokio::time::timeout(TIMEOUT, events.recv())
            .await
            .expect("timed out waiting for health event")
            .expect("poller ended");
        if let HealthEvent::StatusChanged(status) = event
            && status.state == state
        {
            return status;
        }
    }
}
