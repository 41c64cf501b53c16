//! Periodic health poller
//!
//! Probes the active connection on a fixed interval and immediately after
//! every active connection change. Each probe runs as its own task; its
//! result is fed back to the loop and checked against the snapshot it was
//! issued for.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use super::{
    HealthMonitor, HealthStatus, PollInterval, ProbeOutcome, ProbeToken, probe_profile,
};
use crate::client::BackendApi;
use crate::connection::ActiveConnection;

/// Events emitted by the health poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// The health status changed (timestamps alone do not count)
    StatusChanged(HealthStatus),
    /// The poller stopped
    Stopped,
}

/// Handle to control a running poller
///
/// Dropping the handle stops the poller as well.
#[derive(Debug)]
pub struct HealthPollerHandle {
    stop_tx: mpsc::Sender<()>,
}

impl HealthPollerHandle {
    /// Signals the poller to stop
    ///
    /// Probes already in flight are not aborted; their results are ignored.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(()).await;
    }
}

/// Starts a health polling loop.
///
/// `active_rx` is usually obtained from
/// [`SyncDispatcher::subscribe_watch`](crate::connection::SyncDispatcher::subscribe_watch).
/// The first probe runs immediately. A zero `interval` falls back to
/// [`PollInterval::Connectivity`].
///
/// Returns a handle to stop the poller and a receiver for events.
pub fn start_health_poller(
    api: Arc<dyn BackendApi>,
    mut active_rx: watch::Receiver<ActiveConnection>,
    interval: Duration,
) -> (HealthPollerHandle, mpsc::Receiver<HealthEvent>) {
    let interval = if interval.is_zero() {
        tracing::warn!("Zero health poll interval, using the connectivity default");
        PollInterval::Connectivity.duration()
    } else {
        interval
    };
    let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
    let (event_tx, event_rx) = mpsc::channel::<HealthEvent>(16);

    tokio::spawn(async move {
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(ProbeToken, ProbeOutcome)>();
        let mut monitor = HealthMonitor::new();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_reported: Option<HealthStatus> = None;
        let mut watching = true;

        tracing::debug!(interval_ms = interval.as_millis(), "Health poller started");

        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    let _ = event_tx.send(HealthEvent::Stopped).await;
                    break;
                }
                changed = active_rx.changed(), if watching => {
                    if changed.is_err() {
                        // Dispatcher gone: keep probing the last snapshot
                        watching = false;
                        continue;
                    }
                    let snapshot = active_rx.borrow_and_update().clone();
                    issue_probe(&mut monitor, &snapshot, &api, &result_tx);
                    ticker.reset();
                }
                _ = ticker.tick() => {
                    let snapshot = active_rx.borrow().clone();
                    issue_probe(&mut monitor, &snapshot, &api, &result_tx);
                }
                Some((token, outcome)) = result_rx.recv() => {
                    monitor.apply(&token, outcome);
                }
            }

            let status = monitor.status();
            if last_reported.as_ref().is_none_or(|last| !last.same_state(status)) {
                last_reported = Some(status.clone());
                if event_tx
                    .send(HealthEvent::StatusChanged(status.clone()))
                    .await
                    .is_err()
                {
                    break; // receiver dropped
                }
            }
        }

        tracing::debug!("Health poller stopped");
    });

    (HealthPollerHandle { stop_tx }, event_rx)
}

fn issue_probe(
    monitor: &mut HealthMonitor,
    snapshot: &ActiveConnection,
    api: &Arc<dyn BackendApi>,
    result_tx: &mpsc::UnboundedSender<(ProbeToken, ProbeOutcome)>,
) {
    let (Some(token), Some(profile)) = (monitor.begin(snapshot), snapshot.profile.clone()) else {
        return;
    };
    let api = Arc::clone(api);
    let result_tx = result_tx.clone();
    tokio::spawn(async move {
        let outcome = probe_profile(api.as_ref(), &profile).await;
        // The loop may be gone by now
        let _ = result_tx.send((token, outcome));
    });
}
