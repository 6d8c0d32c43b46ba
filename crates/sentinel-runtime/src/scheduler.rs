//! Scheduled broadcast loop.
//!
//! A single process-wide loop that ticks once per minute, visits every known
//! owner record, and fires a one-shot broadcast for each owner whose
//! configured send time matches the current local clock minute. The
//! `last_sent_at` timestamp is the sole re-fire guard: within 60 seconds of
//! a send the owner is skipped, which tolerates tick jitter and re-entry but
//! is deliberately not a day-level guard.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use sentinel_core::models::OwnerId;
use sentinel_store::OwnerStore;

use crate::broadcaster;
use crate::registry::SessionRegistry;

// ── BroadcastScheduler ────────────────────────────────────────────────────────

/// Process-wide broadcast scheduler.
///
/// Call [`BroadcastScheduler::start`] to spin the loop up in a dedicated
/// tokio task; the returned [`SchedulerHandle`] aborts it or awaits its exit.
pub struct BroadcastScheduler {
    store: Arc<OwnerStore>,
    registry: Arc<SessionRegistry>,
    /// Interval between ticks; one minute in production.
    tick_interval: Duration,
}

impl BroadcastScheduler {
    pub fn new(store: Arc<OwnerStore>, registry: Arc<SessionRegistry>, tick_secs: u64) -> Self {
        Self {
            store,
            registry,
            tick_interval: Duration::from_secs(tick_secs),
        }
    }

    /// Start the scheduling loop. Runs until aborted or the process exits;
    /// no per-owner or per-tick failure ever ends it.
    pub fn start(self) -> SchedulerHandle {
        let handle = tokio::spawn(async move {
            self.scheduling_loop().await;
        });
        SchedulerHandle { handle }
    }

    // ── Private implementation ─────────────────────────────────────────────

    async fn scheduling_loop(self) {
        tracing::info!(
            interval_secs = self.tick_interval.as_secs(),
            "broadcast scheduler started"
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        loop {
            interval.tick().await;

            // Minute-granularity clock reading, local time.
            let clock = Local::now().format("%H:%M").to_string();
            self.run_tick(&clock, Utc::now()).await;
        }
    }

    /// Visit every known owner once. Owners are independent: one owner's
    /// failure is logged and the rest of the tick proceeds.
    async fn run_tick(&self, clock_hhmm: &str, now: DateTime<Utc>) {
        for owner in self.store.list_owner_ids() {
            if let Err(e) = self.process_owner(owner, clock_hhmm, now).await {
                tracing::error!(owner, error = %e, "broadcast failed; continuing tick");
            }
        }
    }

    /// Fire a one-shot broadcast for `owner` when it is due and not within
    /// the dedup window.
    async fn process_owner(
        &self,
        owner: OwnerId,
        clock_hhmm: &str,
        now: DateTime<Utc>,
    ) -> sentinel_core::error::Result<()> {
        let record = self.store.load(owner);

        if !record.is_broadcast_active || !record.schedule_time.matches(clock_hhmm) {
            return Ok(());
        }

        if record.within_dedup_window(now) {
            tracing::debug!(owner, "broadcast already sent within this window; skipping");
            return Ok(());
        }

        let Some(session) = self.registry.get(owner) else {
            tracing::warn!(owner, "broadcast due but no live session; skipping");
            return Ok(());
        };

        let report = broadcaster::send(session.as_ref(), &record).await;
        tracing::info!(
            owner,
            attempted = report.attempted,
            delivered = report.delivered,
            "scheduled broadcast finished"
        );

        // The dedup timestamp is recorded regardless of the delivery mix, so
        // a partially failed broadcast is not retried within the window.
        self.store
            .update(owner, |rec| rec.last_sent_at = Some(now))?;
        Ok(())
    }
}

// ── SchedulerHandle ───────────────────────────────────────────────────────────

/// Handle to the background scheduling task.
pub struct SchedulerHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl SchedulerHandle {
    /// Immediately abort the scheduling loop.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Wait for the loop to exit. The loop only exits when aborted or when
    /// its task panics, so an `Ok` return is unexpected in production.
    pub async fn wait(self) -> Result<(), tokio::task::JoinError> {
        self.handle.await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ChatSession, IncomingMessage};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    // ── test doubles ───────────────────────────────────────────────────────

    #[derive(Default)]
    struct CountingSession {
        sent: Mutex<Vec<(String, String)>>,
        fail_destinations: Vec<String>,
    }

    impl CountingSession {
        fn broadcast_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatSession for CountingSession {
        async fn send_message(&self, destination: &str, text: &str) -> anyhow::Result<()> {
            if self.fail_destinations.iter().any(|d| d == destination) {
                anyhow::bail!("destination {destination} unreachable");
            }
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), text.to_string()));
            Ok(())
        }

        async fn send_photo(&self, _destination: &str, _photo: &str) -> anyhow::Result<()> {
            Ok(())
        }

        fn subscribe_messages(&self) -> mpsc::Receiver<IncomingMessage> {
            let (_tx, rx) = mpsc::channel(1);
            rx
        }
    }

    // ── helpers ────────────────────────────────────────────────────────────

    struct Fixture {
        _dir: TempDir,
        store: Arc<OwnerStore>,
        registry: Arc<SessionRegistry>,
        session: Arc<CountingSession>,
    }

    fn fixture_with(fail_destinations: &[&str]) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(OwnerStore::new(dir.path()).unwrap());
        let registry = Arc::new(SessionRegistry::new());
        let session = Arc::new(CountingSession {
            sent: Mutex::new(Vec::new()),
            fail_destinations: fail_destinations.iter().map(|s| s.to_string()).collect(),
        });
        registry.register(1, Arc::clone(&session) as Arc<dyn ChatSession>);

        store
            .update(1, |rec| {
                rec.message = "daily offer".to_string();
                rec.destinations = vec!["A".to_string(), "B".to_string()];
                rec.schedule_time = "09:00".parse().unwrap();
                rec.is_broadcast_active = true;
            })
            .unwrap();

        Fixture {
            _dir: dir,
            store,
            registry,
            session,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(&[])
    }

    fn scheduler(fx: &Fixture) -> BroadcastScheduler {
        BroadcastScheduler::new(Arc::clone(&fx.store), Arc::clone(&fx.registry), 60)
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, m, s).unwrap()
    }

    // ── due check ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_due_owner_broadcasts_once_and_records_timestamp() {
        let fx = fixture();
        let sched = scheduler(&fx);

        let now = at(9, 0, 0);
        sched.run_tick("09:00", now).await;

        // One message to each of the two destinations.
        assert_eq!(fx.session.broadcast_count(), 2);
        assert_eq!(fx.store.load(1).last_sent_at, Some(now));
    }

    #[tokio::test]
    async fn test_wrong_minute_does_not_broadcast() {
        let fx = fixture();
        let sched = scheduler(&fx);

        sched.run_tick("09:01", at(9, 1, 0)).await;

        assert_eq!(fx.session.broadcast_count(), 0);
        assert!(fx.store.load(1).last_sent_at.is_none());
    }

    #[tokio::test]
    async fn test_inactive_owner_is_skipped() {
        let fx = fixture();
        fx.store
            .update(1, |rec| rec.is_broadcast_active = false)
            .unwrap();
        let sched = scheduler(&fx);

        sched.run_tick("09:00", at(9, 0, 0)).await;

        assert_eq!(fx.session.broadcast_count(), 0);
    }

    // ── dedup window ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_second_tick_within_window_is_suppressed() {
        let fx = fixture();
        let sched = scheduler(&fx);

        sched.run_tick("09:00", at(9, 0, 0)).await;
        // A late second tick still inside the same clock minute.
        sched.run_tick("09:00", at(9, 0, 30)).await;

        // Exactly one broadcast (two destinations), not two.
        assert_eq!(fx.session.broadcast_count(), 2);
        assert_eq!(fx.store.load(1).last_sent_at, Some(at(9, 0, 0)));
    }

    #[tokio::test]
    async fn test_tick_outside_window_fires_again() {
        let fx = fixture();
        let sched = scheduler(&fx);

        sched.run_tick("09:00", at(9, 0, 0)).await;
        // 60 seconds later the window has closed; the guard is not
        // day-granular, so a matching clock fires again.
        sched.run_tick("09:00", at(9, 1, 0)).await;

        assert_eq!(fx.session.broadcast_count(), 4);
        assert_eq!(fx.store.load(1).last_sent_at, Some(at(9, 1, 0)));
    }

    // ── failure isolation ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_partial_delivery_failure_still_records_timestamp() {
        let fx = fixture_with(&["A"]);
        let sched = scheduler(&fx);

        let now = at(9, 0, 0);
        sched.run_tick("09:00", now).await;

        // B was still attempted and delivered; the timestamp is recorded
        // regardless of the per-destination mix.
        assert_eq!(fx.session.broadcast_count(), 1);
        assert_eq!(fx.store.load(1).last_sent_at, Some(now));
    }

    #[tokio::test]
    async fn test_owner_without_session_does_not_abort_tick() {
        let fx = fixture();
        // A second due owner with no live session, enumerated first.
        fx.store
            .update(0, |rec| {
                rec.message = "other".to_string();
                rec.destinations = vec!["X".to_string()];
                rec.schedule_time = "09:00".parse().unwrap();
                rec.is_broadcast_active = true;
            })
            .unwrap();
        let sched = scheduler(&fx);

        sched.run_tick("09:00", at(9, 0, 0)).await;

        // Owner 1 still broadcast despite owner 0 having no session; owner 0
        // recorded no timestamp because nothing was attempted.
        assert_eq!(fx.session.broadcast_count(), 2);
        assert!(fx.store.load(0).last_sent_at.is_none());
        assert!(fx.store.load(1).last_sent_at.is_some());
    }

    // ── loop lifecycle ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_start_and_abort() {
        let fx = fixture();
        let handle = scheduler(&fx).start();

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();
        assert!(handle.wait().await.unwrap_err().is_cancelled());
    }
}
