//! Component wiring and lifetime supervision.
//!
//! Brings the store, the session registry, monitoring, and the scheduler up
//! from durable state, then runs until the scheduler task dies. The binary
//! wraps [`run`] in a fixed-backoff restart loop, so an unexpected exit here
//! means "reinitialise everything from the store", mirroring the
//! restart-on-crash policy of the original deployment.

use std::sync::Arc;

use sentinel_store::OwnerStore;

use crate::monitor::MonitoringEngine;
use crate::platform::Notifier;
use crate::registry::SessionRegistry;
use crate::scheduler::BroadcastScheduler;

/// Start monitoring for every owner flagged active, then run the broadcast
/// scheduler for the life of the process.
///
/// Owners flagged `is_monitoring_active` whose sessions have not (yet) been
/// re-established simply fail the monitoring precondition and are logged;
/// the login layer re-registers sessions and calls
/// [`MonitoringEngine::start_monitoring`] again as they come up.
///
/// Returns an error when the scheduler task exits, which in production only
/// happens on a panic; the caller restarts from durable state.
pub async fn run(
    store: Arc<OwnerStore>,
    registry: Arc<SessionRegistry>,
    notifier: Arc<dyn Notifier>,
    tick_secs: u64,
) -> anyhow::Result<()> {
    let engine = MonitoringEngine::new(Arc::clone(&store), Arc::clone(&registry), notifier);

    let mut started = 0usize;
    for owner in store.list_owner_ids() {
        if !store.load(owner).is_monitoring_active {
            continue;
        }
        if engine.start_monitoring(owner) {
            started += 1;
        }
    }
    tracing::info!(started, "monitoring subscriptions established");

    let scheduler = BroadcastScheduler::new(store, registry, tick_secs);
    let handle = scheduler.start();

    match handle.wait().await {
        Ok(()) => anyhow::bail!("broadcast scheduler exited unexpectedly"),
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(anyhow::anyhow!("broadcast scheduler task failed: {e}")),
    }
}
