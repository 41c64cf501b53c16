//! Propagation of the active connection to its dependents

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::watch;

use crate::client::{CredentialSink, RemoteConnection};
use crate::models::{BackendType, ConnectionProfile};

type Listener = Arc<dyn Fn(Option<&ConnectionProfile>) + Send + Sync>;

/// Snapshot of the active connection published on the watch channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveConnection {
    /// Incremented on every dispatch, starting from 1
    pub generation: u64,
    /// The active profile, if any
    pub profile: Option<ConnectionProfile>,
}

impl ActiveConnection {
    /// Returns the ID of the active profile
    #[must_use]
    pub fn profile_id(&self) -> Option<&str> {
        self.profile.as_ref().map(|p| p.id.as_str())
    }
}

struct Inner {
    sink: Arc<dyn CredentialSink>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    generation: AtomicU64,
    active_tx: watch::Sender<ActiveConnection>,
}

/// Pushes the active profile to the request client and to subscribers
///
/// Cloning yields another handle to the same dispatcher.
#[derive(Clone)]
pub struct SyncDispatcher {
    inner: Arc<Inner>,
}

impl SyncDispatcher {
    /// Creates a dispatcher installing credentials into `sink`
    #[must_use]
    pub fn new(sink: Arc<dyn CredentialSink>) -> Self {
        let (active_tx, _) = watch::channel(ActiveConnection::default());
        Self {
            inner: Arc::new(Inner {
                sink,
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
                generation: AtomicU64::new(0),
                active_tx,
            }),
        }
    }

    /// Resolves `active_id` within `profiles` and dispatches it
    ///
    /// Returns the generation of the published snapshot.
    pub fn dispatch(&self, profiles: &[ConnectionProfile], active_id: Option<&str>) -> u64 {
        let active = active_id.and_then(|id| profiles.iter().find(|p| p.id == id));
        self.dispatch_profile(active)
    }

    /// Dispatches `profile` as the active connection
    ///
    /// InfluxDB profiles become the client's default remote connection.
    /// Prometheus profiles and `None` clear it, since Prometheus traffic goes
    /// through the host proxy with per-request headers. Listeners are invoked
    /// synchronously before this returns.
    pub fn dispatch_profile(&self, profile: Option<&ConnectionProfile>) -> u64 {
        let remote = profile
            .filter(|p| p.backend_type == BackendType::Influxdb)
            .map(RemoteConnection::from_profile);
        self.inner.sink.set_remote_connection(remote);

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.active_tx.send_replace(ActiveConnection {
            generation,
            profile: profile.cloned(),
        });

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(profile);
        }

        tracing::debug!(
            generation,
            profile_id = profile.map(|p| p.id.as_str()),
            "Active connection dispatched"
        );
        generation
    }

    /// Registers `callback` to be invoked on every dispatch
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn on_active_connection_changed<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&ConnectionProfile>) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Returns a receiver observing active connection snapshots
    #[must_use]
    pub fn subscribe_watch(&self) -> watch::Receiver<ActiveConnection> {
        self.inner.active_tx.subscribe()
    }

    /// Returns the most recently dispatched snapshot
    #[must_use]
    pub fn current(&self) -> ActiveConnection {
        self.inner.active_tx.borrow().clone()
    }

    /// Returns the number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for SyncDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncDispatcher")
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

/// Registration handle returned by [`SyncDispatcher::on_active_connection_changed`]
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    inner: Weak<Inner>,
    id: u64,
}

impl Subscription {
    /// Unregisters the listener
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
