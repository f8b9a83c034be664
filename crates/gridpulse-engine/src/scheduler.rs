//! Refresh scheduling: per-dataset auto-refresh loops and the debounced
//! force-refresh path.
//!
//! Tasks never mutate view state. An auto-refresh loop only emits
//! `Message::RefreshTick` on its interval; a force refresh emits
//! `RefreshStarted` then exactly one of `RefreshCompleted`/`RefreshFailed`.
//! The engine's update loop applies the actual mutations, which keeps every
//! mutation pass for a dataset strictly serialized.
//!
//! Cancellation is cooperative: `stop_auto_refresh` flips a watch channel
//! and the loop observes it at its next iteration boundary. Callers must not
//! assume the loop has stopped synchronously.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use gridpulse_core::prelude::*;
use gridpulse_core::DatasetId;
use gridpulse_feed::DataService;

use crate::message::Message;

/// Minimum auto-refresh interval (250ms) to prevent tick storms from
/// misconfigured settings.
pub const MIN_AUTO_REFRESH_MS: u64 = 250;

/// One dataset's auto-refresh loop.
#[derive(Debug)]
pub struct RefreshHandle {
    pub dataset: DatasetId,
    pub interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    /// Kept so a replaced handle can be told apart from a finished one.
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Active until a stop has been requested or the loop exited on its own.
    pub fn is_active(&self) -> bool {
        !*self.shutdown_tx.borrow() && !self.task.is_finished()
    }
}

/// Manages refresh loops and the in-flight guard per dataset.
#[derive(Debug)]
pub struct RefreshScheduler {
    msg_tx: mpsc::Sender<Message>,
    handles: HashMap<DatasetId, RefreshHandle>,
    /// Datasets with a force refresh in flight (the debounce guard).
    loading: HashSet<DatasetId>,
    /// Deliberate delay before a force refresh fetches (UX pacing).
    pacing: Duration,
}

impl RefreshScheduler {
    pub fn new(msg_tx: mpsc::Sender<Message>, pacing: Duration) -> Self {
        Self {
            msg_tx,
            handles: HashMap::new(),
            loading: HashSet::new(),
            pacing,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Auto-refresh
    // ─────────────────────────────────────────────────────────────

    /// Start the auto-refresh loop for a dataset.
    ///
    /// A no-op while a loop is already active: two loops for the same
    /// dataset would double-apply deltas and corrupt row-identity tracking.
    pub fn start_auto_refresh(&mut self, dataset: DatasetId, interval: Duration) {
        if let Some(handle) = self.handles.get(&dataset) {
            if handle.is_active() {
                debug!(dataset = %dataset, "auto-refresh already running, start ignored");
                return;
            }
        }

        let interval = interval.max(Duration::from_millis(MIN_AUTO_REFRESH_MS));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let msg_tx = self.msg_tx.clone();
        let ds = dataset.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if msg_tx
                            .send(Message::RefreshTick { dataset: ds.clone() })
                            .await
                            .is_err()
                        {
                            // Engine shut down.
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!(dataset = %ds, "auto-refresh loop stopped");
                            break;
                        }
                    }
                }
            }
        });

        info!(dataset = %dataset, interval_ms = interval.as_millis() as u64, "auto-refresh started");
        self.handles.insert(
            dataset.clone(),
            RefreshHandle {
                dataset,
                interval,
                shutdown_tx,
                task,
            },
        );
    }

    /// Request the loop to stop. Takes effect at the loop's next iteration
    /// boundary; `is_active` reports false immediately.
    pub fn stop_auto_refresh(&mut self, dataset: &DatasetId) {
        if let Some(handle) = self.handles.get(dataset) {
            let _ = handle.shutdown_tx.send(true);
            info!(dataset = %dataset, "auto-refresh stop requested");
        }
    }

    pub fn stop_all(&mut self) {
        for handle in self.handles.values() {
            let _ = handle.shutdown_tx.send(true);
        }
    }

    pub fn is_active(&self, dataset: &DatasetId) -> bool {
        self.handles.get(dataset).is_some_and(RefreshHandle::is_active)
    }

    // ─────────────────────────────────────────────────────────────
    // Force refresh
    // ─────────────────────────────────────────────────────────────

    /// Fetch a full replacement collection for a dataset.
    ///
    /// Dropped while a refresh for the dataset is already in flight
    /// (debounce against repeated clicks). The spawned task always reports
    /// back with `RefreshCompleted` or `RefreshFailed`; the engine clears
    /// the in-flight guard on either, so a failure cannot leave the view
    /// stuck loading.
    pub fn force_refresh<S>(&mut self, dataset: &DatasetId, service: Arc<S>)
    where
        S: DataService + Send + Sync + 'static,
    {
        if self.loading.contains(dataset) {
            debug!(dataset = %dataset, "refresh already in flight, request dropped");
            return;
        }
        self.loading.insert(dataset.clone());

        let msg_tx = self.msg_tx.clone();
        let pacing = self.pacing;
        let ds = dataset.clone();

        tokio::spawn(async move {
            // Yield point: the owner can render a loading indicator before
            // any work happens.
            if msg_tx
                .send(Message::RefreshStarted { dataset: ds.clone() })
                .await
                .is_err()
            {
                return;
            }

            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }

            let outcome = match service.fetch_all(&ds).await {
                Ok(rows) => Message::RefreshCompleted { dataset: ds, rows },
                Err(e) => {
                    warn!(error = %e, "force refresh failed, keeping last known collection");
                    Message::RefreshFailed {
                        dataset: ds,
                        error: e.to_string(),
                    }
                }
            };
            let _ = msg_tx.send(outcome).await;
        });
    }

    /// Clear the in-flight guard. Called by the engine for both completion
    /// messages; this is the `finally` of the force-refresh path.
    pub fn finish_refresh(&mut self, dataset: &DatasetId) {
        self.loading.remove(dataset);
    }

    pub fn is_loading(&self, dataset: &DatasetId) -> bool {
        self.loading.contains(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpulse_core::{Record, RowSet};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingService {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingService {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DataService for CountingService {
        async fn fetch_all(&self, dataset: &DatasetId) -> Result<RowSet> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::fetch(dataset.as_str(), "backend unavailable"));
            }
            Ok(vec![Arc::new(Record::from_pairs([(
                "ticker",
                json!("AAPL"),
            )]))])
        }
    }

    fn dataset() -> DatasetId {
        DatasetId::new("market_data")
    }

    /// Collect messages until `deadline` of virtual time passes.
    async fn drain_window(
        rx: &mut mpsc::Receiver<Message>,
        window: Duration,
    ) -> Vec<Message> {
        let deadline = tokio::time::Instant::now() + window;
        let mut out = Vec::new();
        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                msg = rx.recv() => match msg {
                    Some(m) => out.push(m),
                    None => break,
                },
            }
        }
        out
    }

    fn tick_count(messages: &[Message]) -> usize {
        messages
            .iter()
            .filter(|m| matches!(m, Message::RefreshTick { .. }))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_emits_on_interval() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::ZERO);
        sched.start_auto_refresh(dataset(), Duration::from_millis(1000));

        // Ticks at t=0, 1000, 2000, 3000 inside a 3500ms window.
        let messages = drain_window(&mut rx, Duration::from_millis(3500)).await;
        assert_eq!(tick_count(&messages), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_start_keeps_single_loop() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::ZERO);
        sched.start_auto_refresh(dataset(), Duration::from_millis(1000));
        sched.start_auto_refresh(dataset(), Duration::from_millis(1000));
        sched.start_auto_refresh(dataset(), Duration::from_millis(500));

        let messages = drain_window(&mut rx, Duration::from_millis(3500)).await;
        // A second loop would double the count.
        assert_eq!(tick_count(&messages), 4);
        assert!(sched.is_active(&dataset()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_clamped_to_minimum() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::ZERO);
        sched.start_auto_refresh(dataset(), Duration::from_millis(1));

        // Effective interval is 250ms: ticks at 0, 250, 500, 750, 1000.
        let messages = drain_window(&mut rx, Duration::from_millis(1100)).await;
        assert_eq!(tick_count(&messages), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_terminates_within_an_interval() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::ZERO);
        sched.start_auto_refresh(dataset(), Duration::from_millis(1000));

        let first = drain_window(&mut rx, Duration::from_millis(100)).await;
        assert_eq!(tick_count(&first), 1);

        sched.stop_auto_refresh(&dataset());
        assert!(!sched.is_active(&dataset()), "inactive immediately after stop");

        // Cooperative cancellation: no further ticks arrive.
        let after = drain_window(&mut rx, Duration::from_millis(3000)).await;
        assert_eq!(tick_count(&after), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop_spawns_new_loop() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::ZERO);
        sched.start_auto_refresh(dataset(), Duration::from_millis(1000));
        sched.stop_auto_refresh(&dataset());
        let _ = drain_window(&mut rx, Duration::from_millis(100)).await;

        sched.start_auto_refresh(dataset(), Duration::from_millis(1000));
        assert!(sched.is_active(&dataset()));
        let messages = drain_window(&mut rx, Duration::from_millis(1500)).await;
        assert_eq!(tick_count(&messages), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_debounces_concurrent_requests() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::from_millis(300));
        let service = Arc::new(CountingService::ok());

        sched.force_refresh(&dataset(), service.clone());
        sched.force_refresh(&dataset(), service.clone());
        assert!(sched.is_loading(&dataset()));

        let messages = drain_window(&mut rx, Duration::from_millis(1000)).await;
        let started = messages
            .iter()
            .filter(|m| matches!(m, Message::RefreshStarted { .. }))
            .count();
        let completed = messages
            .iter()
            .filter(|m| matches!(m, Message::RefreshCompleted { .. }))
            .count();
        assert_eq!(started, 1, "second request must be dropped");
        assert_eq!(completed, 1);
        assert_eq!(service.calls(), 1, "exactly one DataService fetch");
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_refresh_allowed_after_finish() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::ZERO);
        let service = Arc::new(CountingService::ok());

        sched.force_refresh(&dataset(), service.clone());
        let _ = drain_window(&mut rx, Duration::from_millis(100)).await;
        sched.finish_refresh(&dataset());
        assert!(!sched.is_loading(&dataset()));

        sched.force_refresh(&dataset(), service.clone());
        let _ = drain_window(&mut rx, Duration::from_millis(100)).await;
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_reports_failure_message() {
        let (tx, mut rx) = mpsc::channel(64);
        let mut sched = RefreshScheduler::new(tx, Duration::ZERO);
        let service = Arc::new(CountingService::failing());

        sched.force_refresh(&dataset(), service);
        let messages = drain_window(&mut rx, Duration::from_millis(100)).await;
        assert!(messages
            .iter()
            .any(|m| matches!(m, Message::RefreshFailed { .. })));
        assert!(!messages
            .iter()
            .any(|m| matches!(m, Message::RefreshCompleted { .. })));
    }
}
