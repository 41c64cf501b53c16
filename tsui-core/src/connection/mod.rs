//! Connection registry and active connection synchronization
//!
//! This module provides the `ConnectionRegistry`, which owns the list of
//! backend profiles and the active pointer and mirrors both into a
//! [`KeyValueStore`](crate::storage::KeyValueStore), and the
//! `SyncDispatcher`, which pushes the active profile to the request client,
//! to in-process listeners and to a watch channel consumed by the health
//! poller.

mod manager;
mod sync;

pub use manager::{ConnectionRegistry, MutationOutcome};
pub use sync::{ActiveConnection, Subscription, SyncDispatcher};
