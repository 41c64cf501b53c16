//! Property tests for profile models

use proptest::prelude::*;
use tsui_core::{BackendType, ConnectionProfile, HostConnection, ProfileDraft, ProfileSource};

fn backend_strategy() -> impl Strategy<Value = BackendType> {
    prop_oneof![Just(BackendType::Influxdb), Just(BackendType::Prometheus)]
}

proptest! {
    /// Property: stored profiles deserialize back to the same value
    #[test]
    fn profile_json_is_stable(
        name in "[A-Za-z0-9 ]{0,16}",
        url in "https?://[a-z]{1,8}",
        backend in backend_strategy(),
        username in "[a-z]{0,6}",
        password in "[a-z0-9]{0,8}",
    ) {
        let draft = ProfileDraft::new(url)
            .with_name(name)
            .with_type(backend)
            .with_credentials(username, password);
        let profile = ConnectionProfile::from_draft("id-1".into(), ProfileSource::Browser, draft);

        let json = serde_json::to_string(&profile).unwrap();
        let parsed: ConnectionProfile = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed, profile);
    }

    /// Property: InfluxDB drafts never keep Alertmanager fields
    #[test]
    fn influxdb_drops_alertmanager(am in "https?://[a-z]{1,8}") {
        let draft = ProfileDraft::new("http://influx:8086")
            .with_alertmanager(am, Some("u".into()), Some("p".into()))
            .normalized();
        prop_assert!(draft.alertmanager_url.is_none());
        prop_assert!(draft.alertmanager_username.is_none());
    }

    /// Property: blank host names are derived from the URL
    #[test]
    fn host_profile_always_named(host in "[a-z]{1,8}", backend in backend_strategy()) {
        let mut conn = HostConnection::new(format!("http://{host}:9000"));
        conn.backend_type = Some(backend);
        let profile = conn.into_profile("x".into());

        prop_assert!(profile.name.starts_with(backend.display_name()));
        prop_assert_eq!(profile.source, ProfileSource::Cli);
    }
}
