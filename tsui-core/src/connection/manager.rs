//! Connection registry
//!
//! The registry is the single owner of the profile list and the active
//! pointer. Every mutation writes the complete new state to the store first
//! and only then replaces the in-memory state, so a storage failure leaves
//! the registry exactly as it was.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use super::sync::SyncDispatcher;
use crate::error::{RegistryError, RegistryResult};
use crate::models::{
    BackendType, ConnectionProfile, DEFAULT_PROFILE_NAME, HostConnection, ProfileDraft,
    ProfileSource,
};
use crate::storage::{
    ACTIVE_CONNECTION_KEY, ACTIVE_CONNECTION_READ_KEYS, CONNECTIONS_KEY, CONNECTIONS_READ_KEYS,
    KeyValueStore, StorageError,
};
use crate::tracing::span_names;

/// Result of a user mutation that may target a read-only profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The change was persisted
    Applied,
    /// The target is a host-supplied profile; nothing changed
    Ignored,
}

impl MutationOutcome {
    /// Returns true if the registry changed
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Registry of backend connection profiles
pub struct ConnectionRegistry {
    store: Arc<dyn KeyValueStore>,
    dispatcher: SyncDispatcher,
    profiles: Vec<ConnectionProfile>,
    active_id: Option<String>,
}

impl ConnectionRegistry {
    /// Opens the registry on `store`
    ///
    /// An active ID that no longer references a profile is dropped. No
    /// dispatch happens here; call [`Self::sync`] once startup is complete.
    #[must_use]
    pub fn open(store: Arc<dyn KeyValueStore>, dispatcher: SyncDispatcher) -> Self {
        let profiles = Self::load(store.as_ref());
        let active_id = Self::load_active_id(store.as_ref())
            .filter(|id| profiles.iter().any(|p| &p.id == id));

        tracing::debug!(
            count = profiles.len(),
            active = active_id.as_deref(),
            "Connection registry opened"
        );

        Self {
            store,
            dispatcher,
            profiles,
            active_id,
        }
    }

    /// Reads the persisted profile list
    ///
    /// Keys are tried in priority order; a key that is absent or does not
    /// hold a JSON array is skipped. Entries that fail to parse, have an
    /// empty URL or repeat an earlier ID are dropped. Missing `type` and
    /// `source` fields are backfilled. Never fails.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Vec<ConnectionProfile> {
        for key in CONNECTIONS_READ_KEYS {
            let Some(raw) = store.get(key) else {
                continue;
            };
            let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(key, error = %e, "Ignoring malformed connection list");
                    continue;
                }
            };

            let mut seen = HashSet::new();
            let mut profiles = Vec::with_capacity(entries.len());
            for entry in entries {
                let mut profile: ConnectionProfile = match serde_json::from_value(entry) {
                    Ok(profile) => profile,
                    Err(e) => {
                        tracing::warn!(key, error = %e, "Skipping malformed connection entry");
                        continue;
                    }
                };
                profile.url = profile.url.trim().to_string();
                if profile.url.is_empty() || !seen.insert(profile.id.clone()) {
                    tracing::warn!(key, id = %profile.id, "Skipping invalid connection entry");
                    continue;
                }
                profiles.push(profile);
            }
            return profiles;
        }
        Vec::new()
    }

    /// Reads the persisted active connection ID
    #[must_use]
    pub fn load_active_id(store: &dyn KeyValueStore) -> Option<String> {
        ACTIVE_CONNECTION_READ_KEYS
            .iter()
            .filter_map(|key| store.get(key))
            .map(|id| id.trim().to_string())
            .find(|id| !id.is_empty())
    }

    // ========== Read Accessors ==========

    /// Returns all profiles in insertion order
    #[must_use]
    pub fn profiles(&self) -> &[ConnectionProfile] {
        &self.profiles
    }

    /// Returns the profile with the given ID
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConnectionProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Returns the active profile ID
    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Returns the active profile
    #[must_use]
    pub fn active(&self) -> Option<&ConnectionProfile> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    /// Returns the number of profiles
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if there are no profiles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Returns the dispatcher notified on active connection changes
    #[must_use]
    pub const fn dispatcher(&self) -> &SyncDispatcher {
        &self.dispatcher
    }

    /// Looks a profile up by exact name, ID, case-insensitive name, then
    /// unique name or ID prefix
    #[must_use]
    pub fn find(&self, name_or_id: &str) -> Option<&ConnectionProfile> {
        if let Some(profile) = self.profiles.iter().find(|p| p.name == name_or_id) {
            return Some(profile);
        }
        if let Some(profile) = self.get(name_or_id) {
            return Some(profile);
        }
        if let Some(profile) = self
            .profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name_or_id))
        {
            return Some(profile);
        }
        match self.prefix_matches(name_or_id).as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Returns profiles whose name (case-insensitive) or ID starts with `prefix`
    #[must_use]
    pub fn prefix_matches(&self, prefix: &str) -> Vec<&ConnectionProfile> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let lower = prefix.to_lowercase();
        self.profiles
            .iter()
            .filter(|p| p.name.to_lowercase().starts_with(&lower) || p.id.starts_with(prefix))
            .collect()
    }

    // ========== Mutations ==========

    /// Appends a profile for every host connection whose URL is not already
    /// present
    ///
    /// Duplicates within `host_connections` are also collapsed. The active
    /// connection is not changed and no dispatch happens.
    ///
    /// # Returns
    ///
    /// The number of profiles added
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the registry is unchanged.
    pub fn merge_host_connections(
        &mut self,
        host_connections: &[HostConnection],
    ) -> RegistryResult<usize> {
        let _span =
            crate::trace_operation!(span_names::HOST_MERGE, count = host_connections.len()).entered();
        let mut known: HashSet<String> = self.profiles.iter().map(|p| p.url.clone()).collect();
        let mut next = self.profiles.clone();

        for host in host_connections {
            let url = host.trimmed_url();
            if url.is_empty() || !known.insert(url.to_string()) {
                continue;
            }
            next.push(host.clone().into_profile(Uuid::new_v4().to_string()));
        }

        let added = next.len() - self.profiles.len();
        if added == 0 {
            tracing::debug!("No new host connections to merge");
            return Ok(0);
        }

        self.commit(next, self.active_id.clone())?;
        tracing::info!(added, "Merged host connections");
        Ok(added)
    }

    /// Creates and activates a "Default" profile for `url`
    ///
    /// Only acts when the registry is empty and `url` is non-blank.
    ///
    /// # Returns
    ///
    /// `true` if a profile was seeded (and dispatched)
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails; the registry is unchanged.
    pub fn seed_default(&mut self, url: &str) -> RegistryResult<bool> {
        if !self.profiles.is_empty() || url.trim().is_empty() {
            return Ok(false);
        }

        let profile = ConnectionProfile::from_draft(
            Uuid::new_v4().to_string(),
            ProfileSource::Browser,
            ProfileDraft::new(url)
                .with_name(DEFAULT_PROFILE_NAME)
                .with_type(BackendType::Influxdb),
        );
        let id = profile.id.clone();
        self.commit(vec![profile], Some(id))?;
        tracing::info!(url = url.trim(), "Seeded default connection");
        self.sync();
        Ok(true)
    }

    /// Adds a user profile
    ///
    /// The profile becomes active when it is the first one or nothing is
    /// active.
    ///
    /// # Returns
    ///
    /// The ID of the new profile
    ///
    /// # Errors
    ///
    /// Returns `EmptyUrl` for a blank URL, or a storage error; in both cases
    /// the registry is unchanged.
    pub fn add(&mut self, draft: ProfileDraft) -> RegistryResult<String> {
        if draft.validated_url().is_none() {
            return Err(RegistryError::EmptyUrl);
        }

        let profile =
            ConnectionProfile::from_draft(Uuid::new_v4().to_string(), ProfileSource::Browser, draft);
        let id = profile.id.clone();
        let activate = self.active_id.is_none();

        let mut next = self.profiles.clone();
        next.push(profile);
        let next_active = if activate {
            Some(id.clone())
        } else {
            self.active_id.clone()
        };

        self.commit(next, next_active)?;
        tracing::info!(id = %id, activated = activate, "Connection added");
        if activate {
            self.sync();
        }
        Ok(id)
    }

    /// Replaces the editable fields of a user profile
    ///
    /// Host-supplied profiles are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID, `EmptyUrl` for a blank URL, or
    /// a storage error; the registry is unchanged in every error case.
    pub fn edit(&mut self, id: &str, draft: ProfileDraft) -> RegistryResult<MutationOutcome> {
        let index = self.index_of(id)?;
        if !self.profiles[index].is_user_managed() {
            tracing::debug!(id, "Ignoring edit of host-supplied connection");
            return Ok(MutationOutcome::Ignored);
        }
        if draft.validated_url().is_none() {
            return Err(RegistryError::EmptyUrl);
        }

        let mut next = self.profiles.clone();
        next[index].apply_draft(draft);
        self.commit(next, self.active_id.clone())?;
        tracing::info!(id, "Connection updated");

        if self.active_id.as_deref() == Some(id) {
            self.sync();
        }
        Ok(MutationOutcome::Applied)
    }

    /// Deletes a user profile
    ///
    /// Removing the active profile activates the first remaining one, or
    /// nothing if the registry is now empty.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID or a storage error; the registry
    /// is unchanged in both cases.
    pub fn remove(&mut self, id: &str) -> RegistryResult<MutationOutcome> {
        let index = self.index_of(id)?;
        if !self.profiles[index].is_user_managed() {
            tracing::debug!(id, "Ignoring removal of host-supplied connection");
            return Ok(MutationOutcome::Ignored);
        }

        let mut next = self.profiles.clone();
        next.remove(index);
        let was_active = self.active_id.as_deref() == Some(id);
        let next_active = if was_active {
            next.first().map(|p| p.id.clone())
        } else {
            self.active_id.clone()
        };

        self.commit(next, next_active)?;
        tracing::info!(id, was_active, "Connection removed");
        if was_active {
            self.sync();
        }
        Ok(MutationOutcome::Applied)
    }

    /// Makes `id` the active profile
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID or a storage error; the registry
    /// is unchanged in both cases.
    pub fn activate(&mut self, id: &str) -> RegistryResult<()> {
        self.index_of(id)?;
        self.commit(self.profiles.clone(), Some(id.to_string()))?;
        tracing::info!(id, "Connection activated");
        self.sync();
        Ok(())
    }

    /// Dispatches the current active profile
    ///
    /// Returns the generation of the published snapshot.
    pub fn sync(&self) -> u64 {
        self.dispatcher
            .dispatch(&self.profiles, self.active_id.as_deref())
    }

    // ========== Persistence ==========

    fn index_of(&self, id: &str) -> RegistryResult<usize> {
        self.profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Persists the candidate state and, on success, makes it current
    fn commit(
        &mut self,
        profiles: Vec<ConnectionProfile>,
        active_id: Option<String>,
    ) -> RegistryResult<()> {
        if let Err(e) = self.persist(&profiles, active_id.as_deref()) {
            tracing::error!(error = %e, "Failed to persist connections");
            return Err(e);
        }
        self.profiles = profiles;
        self.active_id = active_id;
        Ok(())
    }

    fn persist(&self, profiles: &[ConnectionProfile], active_id: Option<&str>) -> RegistryResult<()> {
        let json = serde_json::to_string(profiles)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        let previous = self.store.get(CONNECTIONS_KEY);
        self.store.set(CONNECTIONS_KEY, &json)?;

        let active_written = match active_id {
            Some(id) => self.store.set(ACTIVE_CONNECTION_KEY, id),
            None => self.store.remove(ACTIVE_CONNECTION_KEY),
        };
        if let Err(e) = active_written {
            // Put the list back so list and active ID stay consistent on disk
            let restored = match previous {
                Some(previous) => self.store.set(CONNECTIONS_KEY, &previous),
                None => self.store.remove(CONNECTIONS_KEY),
            };
            if let Err(restore_err) = restored {
                tracing::error!(error = %restore_err, "Failed to restore connection list");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("profiles", &self.profiles)
            .field("active_id", &self.active_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::client::{CredentialSink, RemoteConnection};
    use crate::storage::{MemoryStore, StorageResult};

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<Option<RemoteConnection>>>,
    }

    impl CredentialSink for RecordingSink {
        fn set_remote_connection(&self, remote: Option<RemoteConnection>) {
            self.calls.lock().unwrap().push(remote);
        }
    }

    /// Store whose writes can be switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            self.inner.remove(key)
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        sink: Arc<RecordingSink>,
        registry: ConnectionRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_store(Arc::new(MemoryStore::new()))
        }

        fn with_store(store: Arc<MemoryStore>) -> Self {
            let sink = Arc::new(RecordingSink::default());
            let registry = ConnectionRegistry::open(store.clone(), SyncDispatcher::new(sink.clone()));
            Self {
                store,
                sink,
                registry,
            }
        }

        fn dispatch_count(&self) -> usize {
            self.sink.calls.lock().unwrap().len()
        }

        fn reopen(&self) -> ConnectionRegistry {
            ConnectionRegistry::open(
                self.store.clone(),
                SyncDispatcher::new(Arc::new(RecordingSink::default())),
            )
        }
    }

    fn draft(name: &str, url: &str) -> ProfileDraft {
        ProfileDraft::new(url).with_name(name)
    }

    #[test]
    fn test_seed_default_on_empty_registry() {
        let mut fx = Fixture::new();

        assert!(fx.registry.seed_default("http://localhost:8086").unwrap());

        let profiles = fx.registry.profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Default");
        assert_eq!(profiles[0].backend_type, BackendType::Influxdb);
        assert_eq!(profiles[0].source, ProfileSource::Browser);
        assert_eq!(fx.registry.active_id(), Some(profiles[0].id.as_str()));
        assert_eq!(fx.dispatch_count(), 1);
    }

    #[test]
    fn test_seed_default_skipped_when_not_empty_or_blank() {
        let mut fx = Fixture::new();
        assert!(!fx.registry.seed_default("   ").unwrap());
        fx.registry.add(draft("A", "https://a")).unwrap();
        assert!(!fx.registry.seed_default("http://localhost:8086").unwrap());
        assert_eq!(fx.registry.len(), 1);
    }

    #[test]
    fn test_merge_keeps_active_and_dedups_by_url() {
        let mut fx = Fixture::new();
        let a = fx.registry.add(draft("A", "https://a")).unwrap();
        let dispatches = fx.dispatch_count();

        let added = fx
            .registry
            .merge_host_connections(&[
                HostConnection::new("https://a"),
                HostConnection::new("https://b"),
                HostConnection::new(" https://b "),
            ])
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(fx.registry.len(), 2);
        let b = &fx.registry.profiles()[1];
        assert_eq!(b.url, "https://b");
        assert_eq!(b.source, ProfileSource::Cli);
        assert_eq!(fx.registry.active_id(), Some(a.as_str()));
        assert_eq!(fx.dispatch_count(), dispatches);

        assert_eq!(
            fx.registry
                .merge_host_connections(&[HostConnection::new("https://b")])
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_add_rejects_blank_url() {
        let mut fx = Fixture::new();
        let err = fx.registry.add(draft("A", "  \t ")).unwrap_err();
        assert!(matches!(err, RegistryError::EmptyUrl));
        assert!(fx.registry.is_empty());
        assert!(fx.store.is_empty());
        assert_eq!(fx.dispatch_count(), 0);
    }

    #[test]
    fn test_add_activates_only_first() {
        let mut fx = Fixture::new();
        let a = fx.registry.add(draft("A", "https://a")).unwrap();
        let b = fx.registry.add(draft("B", "https://b")).unwrap();

        assert_ne!(a, b);
        assert_eq!(fx.registry.active_id(), Some(a.as_str()));
        assert_eq!(fx.dispatch_count(), 1);
    }

    #[test]
    fn test_remove_active_selects_first_remaining() {
        let mut fx = Fixture::new();
        let a = fx.registry.add(draft("A", "https://a")).unwrap();
        let b = fx.registry.add(draft("B", "https://b")).unwrap();

        let notified = Arc::new(Mutex::new(Vec::new()));
        let notified_clone = Arc::clone(&notified);
        let _sub = fx
            .registry
            .dispatcher()
            .on_active_connection_changed(move |p| {
                notified_clone.lock().unwrap().push(p.map(|p| p.id.clone()));
            });

        let outcome = fx.registry.remove(&a).unwrap();

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(fx.registry.active_id(), Some(b.as_str()));
        assert_eq!(*notified.lock().unwrap(), vec![Some(b.clone())]);

        fx.registry.remove(&b).unwrap();
        assert!(fx.registry.active_id().is_none());
        assert_eq!(notified.lock().unwrap().last(), Some(&None));
    }

    #[test]
    fn test_remove_inactive_does_not_dispatch() {
        let mut fx = Fixture::new();
        fx.registry.add(draft("A", "https://a")).unwrap();
        let b = fx.registry.add(draft("B", "https://b")).unwrap();
        let before = fx.dispatch_count();

        fx.registry.remove(&b).unwrap();
        assert_eq!(fx.dispatch_count(), before);
    }

    #[test]
    fn test_cli_profiles_are_read_only() {
        let mut fx = Fixture::new();
        fx.registry
            .merge_host_connections(&[HostConnection::new("https://host")])
            .unwrap();
        let id = fx.registry.profiles()[0].id.clone();
        let before = fx.registry.profiles().to_vec();

        assert_eq!(
            fx.registry.edit(&id, draft("X", "https://x")).unwrap(),
            MutationOutcome::Ignored
        );
        assert_eq!(fx.registry.remove(&id).unwrap(), MutationOutcome::Ignored);
        assert_eq!(fx.registry.profiles(), before.as_slice());
        assert!(fx.registry.active_id().is_none());
    }

    #[test]
    fn test_edit_active_dispatches_once() {
        let mut fx = Fixture::new();
        let a = fx.registry.add(draft("A", "https://a")).unwrap();
        let before = fx.dispatch_count();

        fx.registry
            .edit(&a, draft("A2", "https://a2").with_credentials("u", "p"))
            .unwrap();

        assert_eq!(fx.dispatch_count(), before + 1);
        let calls = fx.sink.calls.lock().unwrap();
        assert_eq!(calls.last().unwrap().as_ref().unwrap().url, "https://a2");
    }

    #[test]
    fn test_edit_rejects_blank_url_and_unknown_id() {
        let mut fx = Fixture::new();
        let a = fx.registry.add(draft("A", "https://a")).unwrap();

        assert!(matches!(
            fx.registry.edit(&a, draft("A", "")),
            Err(RegistryError::EmptyUrl)
        ));
        assert!(matches!(
            fx.registry.edit("nope", draft("A", "https://a")),
            Err(RegistryError::NotFound(_))
        ));
        assert_eq!(fx.registry.get(&a).unwrap().url, "https://a");
    }

    #[test]
    fn test_activate_unknown_is_rejected() {
        let mut fx = Fixture::new();
        fx.registry.add(draft("A", "https://a")).unwrap();
        let before = fx.dispatch_count();

        assert!(matches!(
            fx.registry.activate("missing"),
            Err(RegistryError::NotFound(_))
        ));
        assert_eq!(fx.dispatch_count(), before);
    }

    #[test]
    fn test_state_survives_reopen() {
        let mut fx = Fixture::new();
        fx.registry.add(draft("A", "https://a")).unwrap();
        let b = fx.registry.add(draft("B", "https://b")).unwrap();
        fx.registry.activate(&b).unwrap();

        let reopened = fx.reopen();
        assert_eq!(reopened.profiles(), fx.registry.profiles());
        assert_eq!(reopened.active_id(), Some(b.as_str()));
    }

    #[test]
    fn test_load_falls_back_to_legacy_keys() {
        let legacy = r#"[{"id":"1","name":"Old","url":"http://old:8086","username":"","password":""}]"#;
        let store = Arc::new(MemoryStore::with_entries([
            ("tidedb-connections", legacy),
            ("tidedb-active-connection", "1"),
        ]));
        let fx = Fixture::with_store(store);

        assert_eq!(fx.registry.len(), 1);
        assert_eq!(fx.registry.profiles()[0].backend_type, BackendType::Influxdb);
        assert_eq!(fx.registry.profiles()[0].source, ProfileSource::Browser);
        assert_eq!(fx.registry.active_id(), Some("1"));
    }

    #[test]
    fn test_load_skips_malformed_data() {
        let store = MemoryStore::with_entries([
            (CONNECTIONS_KEY, "{not json"),
            (
                "tidedb-connections",
                r#"[{"id":"1","url":"http://a"},{"name":"no id"},{"id":"1","url":"http://dup"},{"id":"2","url":"  "}]"#,
            ),
        ]);
        let profiles = ConnectionRegistry::load(&store);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].id, "1");

        let garbage = MemoryStore::with_entries([(CONNECTIONS_KEY, "42")]);
        assert!(ConnectionRegistry::load(&garbage).is_empty());
    }

    #[test]
    fn test_dangling_active_id_is_dropped() {
        let store = Arc::new(MemoryStore::with_entries([
            (CONNECTIONS_KEY, r#"[{"id":"1","url":"http://a"}]"#),
            (ACTIVE_CONNECTION_KEY, "gone"),
        ]));
        let fx = Fixture::with_store(store);
        assert!(fx.registry.active_id().is_none());
    }

    #[test]
    fn test_storage_failure_keeps_previous_state() {
        let store = Arc::new(FlakyStore::default());
        let sink = Arc::new(RecordingSink::default());
        let mut registry = ConnectionRegistry::open(store.clone(), SyncDispatcher::new(sink.clone()));
        let a = registry.add(draft("A", "https://a")).unwrap();

        store.failing.store(true, Ordering::SeqCst);
        assert!(matches!(
            registry.add(draft("B", "https://b")),
            Err(RegistryError::Storage(_))
        ));
        assert!(matches!(registry.remove(&a), Err(RegistryError::Storage(_))));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.active_id(), Some(a.as_str()));
        assert_eq!(sink.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_find_by_name_id_and_prefix() {
        let mut fx = Fixture::new();
        let prod = fx.registry.add(draft("Production", "https://prod")).unwrap();
        fx.registry.add(draft("Staging", "https://stage")).unwrap();
        fx.registry.add(draft("Stage-2", "https://stage2")).unwrap();

        assert_eq!(fx.registry.find("Production").unwrap().id, prod);
        assert_eq!(fx.registry.find(&prod).unwrap().name, "Production");
        assert_eq!(fx.registry.find("production").unwrap().id, prod);
        assert_eq!(fx.registry.find("prod").unwrap().id, prod);
        assert!(fx.registry.find("stag").is_none());
        assert_eq!(fx.registry.prefix_matches("stag").len(), 2);
        assert!(fx.registry.find("zzz").is_none());
    }
}
