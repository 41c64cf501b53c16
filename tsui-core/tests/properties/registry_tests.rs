//! Property tests for the connection registry

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tsui_core::{
    ConnectionRegistry, CredentialSink, HostConnection, KeyValueStore, MemoryStore,
    MutationOutcome, ProfileDraft, ProfileSource, RegistryError, RemoteConnection,
    SyncDispatcher,
};

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<Option<String>>>,
}

impl RecordingSink {
    fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CredentialSink for RecordingSink {
    fn set_remote_connection(&self, remote: Option<RemoteConnection>) {
        self.calls.lock().unwrap().push(remote.map(|r| r.url));
    }
}

fn open(store: &Arc<MemoryStore>, sink: &Arc<RecordingSink>) -> ConnectionRegistry {
    let store: Arc<dyn KeyValueStore> = store.clone();
    ConnectionRegistry::open(store, SyncDispatcher::new(sink.clone()))
}

#[derive(Debug, Clone)]
enum Op {
    Add { name: String, url: String },
    Edit { index: usize, url: String },
    Remove { index: usize },
    Activate { index: usize },
}

fn url_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "https?://[a-z]{1,8}(:[0-9]{2,4})?",
        Just("   ".to_string()),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        ("[A-Za-z][A-Za-z0-9 ]{0,12}", url_strategy())
            .prop_map(|(name, url)| Op::Add { name, url }),
        (0usize..8, url_strategy()).prop_map(|(index, url)| Op::Edit { index, url }),
        (0usize..8).prop_map(|index| Op::Remove { index }),
        (0usize..8).prop_map(|index| Op::Activate { index }),
    ]
}

fn id_at(registry: &ConnectionRegistry, index: usize) -> Option<String> {
    let len = registry.len();
    (len > 0).then(|| registry.profiles()[index % len].id.clone())
}

fn apply(registry: &mut ConnectionRegistry, op: &Op) {
    match op {
        Op::Add { name, url } => {
            let result = registry.add(ProfileDraft::new(url.clone()).with_name(name.clone()));
            if url.trim().is_empty() {
                assert!(matches!(result, Err(RegistryError::EmptyUrl)));
            } else {
                assert!(result.is_ok());
            }
        }
        Op::Edit { index, url } => {
            if let Some(id) = id_at(registry, *index) {
                let _ = registry.edit(&id, ProfileDraft::new(url.clone()));
            }
        }
        Op::Remove { index } => {
            if let Some(id) = id_at(registry, *index) {
                registry.remove(&id).unwrap();
            }
        }
        Op::Activate { index } => {
            if let Some(id) = id_at(registry, *index) {
                registry.activate(&id).unwrap();
            }
        }
    }
}

proptest! {
    /// Property: any mutation sequence survives a reload unchanged
    #[test]
    fn reload_reproduces_registry(ops in prop::collection::vec(op_strategy(), 0..24)) {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let mut registry = open(&store, &sink);

        for op in &ops {
            apply(&mut registry, op);
        }

        let reloaded = open(&store, &sink);
        prop_assert_eq!(reloaded.profiles(), registry.profiles());
        prop_assert_eq!(reloaded.active_id(), registry.active_id());
    }

    /// Property: the active ID always names an existing profile
    #[test]
    fn active_id_is_never_dangling(ops in prop::collection::vec(op_strategy(), 0..24)) {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let mut registry = open(&store, &sink);

        for op in &ops {
            apply(&mut registry, op);
            if let Some(active) = registry.active_id() {
                prop_assert!(registry.get(active).is_some());
            }
            prop_assert!(registry.profiles().iter().all(|p| !p.url.trim().is_empty()));
        }
    }

    /// Property: merging the same host list twice adds nothing the second time
    #[test]
    fn host_merge_is_idempotent(
        urls in prop::collection::vec("https?://[a-z]{1,6}", 0..8),
    ) {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let mut registry = open(&store, &sink);
        let hosts: Vec<HostConnection> = urls.iter().map(HostConnection::new).collect();

        let first = registry.merge_host_connections(&hosts).unwrap();
        let len = registry.len();
        let second = registry.merge_host_connections(&hosts).unwrap();

        let mut distinct = urls.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(first, distinct.len());
        prop_assert_eq!(second, 0);
        prop_assert_eq!(registry.len(), len);
        prop_assert_eq!(sink.count(), 0);
    }

    /// Property: host-supplied profiles ignore edit and remove
    #[test]
    fn host_profiles_are_read_only(url in "https?://[a-z]{1,8}", new_url in "https?://[a-z]{1,8}") {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let mut registry = open(&store, &sink);
        registry.merge_host_connections(&[HostConnection::new(url)]).unwrap();
        let id = registry.profiles()[0].id.clone();
        let before = registry.profiles().to_vec();

        prop_assert_eq!(registry.edit(&id, ProfileDraft::new(new_url)).unwrap(), MutationOutcome::Ignored);
        prop_assert_eq!(registry.remove(&id).unwrap(), MutationOutcome::Ignored);
        prop_assert_eq!(registry.profiles(), before.as_slice());
        prop_assert_eq!(registry.profiles()[0].source, ProfileSource::Cli);
    }

    /// Property: removing the active profile dispatches the fallback exactly once
    #[test]
    fn remove_active_dispatches_once(count in 1usize..6, pick in 0usize..6) {
        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::default());
        let mut registry = open(&store, &sink);
        for i in 0..count {
            registry.add(ProfileDraft::new(format!("https://h{i}"))).unwrap();
        }
        let id = registry.profiles()[pick % count].id.clone();
        registry.activate(&id).unwrap();
        let before = sink.count();

        registry.remove(&id).unwrap();

        prop_assert_eq!(sink.count(), before + 1);
        let expected = registry.profiles().first().map(|p| p.id.clone());
        prop_assert_eq!(registry.active_id().map(str::to_string), expected);
    }
}
