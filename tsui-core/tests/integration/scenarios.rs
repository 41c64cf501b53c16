//! End-to-end registry scenarios

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tsui_core::{
    BackendType, ConnectionRegistry, HealthState, HostConnection, KeyValueStore, MemoryStore,
    ProfileDraft, ProfileSource, RequestClient, SyncDispatcher, probe_profile,
};

fn client(host: Option<&str>) -> Arc<RequestClient> {
    Arc::new(RequestClient::new(host, Duration::from_secs(5)).expect("client"))
}

fn registry(client: &Arc<RequestClient>) -> ConnectionRegistry {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    ConnectionRegistry::open(store, SyncDispatcher::new(client.clone()))
}

#[test]
fn seed_default_on_empty_registry() {
    let client = client(None);
    let mut registry = registry(&client);

    assert!(registry.seed_default("http://localhost:8086").unwrap());

    assert_eq!(registry.len(), 1);
    let profile = registry.active().expect("seeded profile is active");
    assert_eq!(profile.name, "Default");
    assert_eq!(profile.backend_type, BackendType::Influxdb);
    assert_eq!(
        client.remote_connection().map(|r| r.url),
        Some("http://localhost:8086".to_string())
    );
}

#[test]
fn host_merge_keeps_user_profile_active() {
    let client = client(None);
    let mut registry = registry(&client);
    let a = registry
        .add(ProfileDraft::new("https://a").with_name("A"))
        .unwrap();

    let added = registry
        .merge_host_connections(&[HostConnection::new("https://a"), HostConnection::new("https://b")])
        .unwrap();

    assert_eq!(added, 1);
    assert_eq!(registry.len(), 2);
    let b = &registry.profiles()[1];
    assert_eq!(b.url, "https://b");
    assert_eq!(b.source, ProfileSource::Cli);
    assert_eq!(registry.active_id(), Some(a.as_str()));
}

#[test]
fn removing_active_notifies_fallback() {
    let client = client(None);
    let mut registry = registry(&client);
    let a = registry
        .add(ProfileDraft::new("https://a").with_name("A"))
        .unwrap();
    let b = registry
        .add(ProfileDraft::new("https://b").with_name("B"))
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let _subscription = registry
        .dispatcher()
        .on_active_connection_changed(move |profile| {
            seen_clone
                .lock()
                .unwrap()
                .push(profile.map(|p| p.id.clone()));
        });

    registry.remove(&a).unwrap();

    assert_eq!(registry.active_id(), Some(b.as_str()));
    assert_eq!(*seen.lock().unwrap(), vec![Some(b)]);
}

#[tokio::test]
async fn prometheus_build_info_reports_version() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/proxy/prometheus/")
        .match_query(mockito::Matcher::UrlEncoded(
            "path".into(),
            "/api/v1/status/buildinfo".into(),
        ))
        .with_status(200)
        .with_body(r#"{"status":"success","data":{"version":"2.45.0"}}"#)
        .create_async()
        .await;

    let client = client(Some(&server.url()));
    let mut registry = registry(&client);
    registry
        .add(
            ProfileDraft::new("http://prometheus:9090")
                .with_name("Prom")
                .with_type(BackendType::Prometheus)
                .with_alertmanager("http://alertmanager:9093", None, None),
        )
        .unwrap();
    assert!(client.remote_connection().is_none());

    let profile = registry.active().expect("active").clone();
    let outcome = probe_profile(client.as_ref(), &profile).await;

    mock.assert_async().await;
    assert!(outcome.connected);
    assert_eq!(outcome.version.as_deref(), Some("2.45.0"));

    let status = {
        let mut monitor = tsui_core::HealthMonitor::new();
        let token = monitor
            .begin(&registry.dispatcher().current())
            .expect("probe token");
        monitor.apply(&token, outcome);
        monitor.status().clone()
    };
    assert_eq!(status.state, HealthState::Connected);
}
