//! The monitor scheduler.
//!
//! Lifecycle: `Idle` until some subscriber is activated, then `Polling` until
//! a cycle starts and finds nobody active. At most one loop exists at a time.
//!
//! For each cycle it:
//!   1. Reads the active subscribers and the admin page cap.
//!   2. Fetches once, deep enough for the deepest subscriber.
//!   3. Spawns one task per subscriber: evaluate, reconcile, apply.
//!   4. Joins every task, then sleeps `poll_interval`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use tokio::sync::{Mutex, watch};
use tracing::{Instrument, Span, debug, error, info, warn};

use common::logger::{TraceId, child_span, cycle_span, warn_if_slow};
use market::{DataSource, SnapshotSet};
use subscriber::{
    Subscriber, SubscriberFilterConfig, SubscriberId, SubscriberManager, store::SettingsStore,
};

use crate::filter::evaluate;
use crate::reconcile::{apply, reconcile};
use crate::sink::DisplaySink;
use crate::state::{DisplayState, DisplayStateStore};
use crate::types::{CycleReport, MonitorConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Polling,
}

pub struct MonitorScheduler<D, K, S: SettingsStore> {
    cfg: MonitorConfig,
    source: Arc<D>,
    sink: Arc<K>,
    subscribers: Arc<SubscriberManager<S>>,
    displays: DisplayStateStore,

    /// Held while deciding whether the loop keeps running or is started.
    state: Mutex<LoopState>,

    shutdown: watch::Sender<bool>,
    cycles: AtomicU64,
    loops_started: AtomicU64,
}

impl<D, K, S> MonitorScheduler<D, K, S>
where
    D: DataSource,
    K: DisplaySink,
    S: SettingsStore + 'static,
{
    pub fn new(
        cfg: MonitorConfig,
        source: Arc<D>,
        sink: Arc<K>,
        subscribers: Arc<SubscriberManager<S>>,
    ) -> Arc<Self> {
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            cfg,
            source,
            sink,
            subscribers,
            displays: DisplayStateStore::new(),
            state: Mutex::new(LoopState::Idle),
            shutdown,
            cycles: AtomicU64::new(0),
            loops_started: AtomicU64::new(0),
        })
    }

    pub fn subscribers(&self) -> &Arc<SubscriberManager<S>> {
        &self.subscribers
    }

    pub async fn is_polling(&self) -> bool {
        *self.state.lock().await == LoopState::Polling
    }

    /// How many times the loop has gone from `Idle` to `Polling`.
    pub fn loops_started(&self) -> u64 {
        self.loops_started.load(Ordering::Relaxed)
    }

    pub async fn display_state(&self, id: SubscriberId) -> Option<DisplayState> {
        self.displays.snapshot(id).await
    }

    // ------------------------------------------------------------------
    // Control surface. Each change is visible to the next cycle.
    // ------------------------------------------------------------------

    /// Turn monitoring on, creating default settings for unknown ids.
    pub async fn activate(self: &Arc<Self>, id: SubscriberId) -> anyhow::Result<()> {
        if self.subscribers.set_active(id, true).await? {
            info!(subscriber_id = id, "monitoring activated");
        }
        self.ensure_polling().await;
        Ok(())
    }

    /// Turn monitoring off. What the subscriber sees is left in place.
    pub async fn deactivate(&self, id: SubscriberId) -> anyhow::Result<()> {
        if self.subscribers.set_active(id, false).await? {
            info!(subscriber_id = id, "monitoring deactivated");
        }
        Ok(())
    }

    /// Validated replacement of the subscriber's bounds and depth.
    pub async fn update_filter(
        &self,
        id: SubscriberId,
        config: SubscriberFilterConfig,
    ) -> anyhow::Result<()> {
        self.subscribers.update_filter(id, config).await?;
        debug!(subscriber_id = id, "filter updated");
        Ok(())
    }

    pub async fn exclude(&self, id: SubscriberId, identity: &str) -> anyhow::Result<bool> {
        self.subscribers.exclude(id, identity).await
    }

    pub async fn include(&self, id: SubscriberId, identity: &str) -> anyhow::Result<bool> {
        self.subscribers.include(id, identity).await
    }

    pub async fn clear_exclusions(&self, id: SubscriberId) -> anyhow::Result<usize> {
        self.subscribers.clear_exclusions(id).await
    }

    /// Forget the subscriber and everything it was shown.
    pub async fn remove(&self, id: SubscriberId) -> anyhow::Result<bool> {
        let existed = self.subscribers.remove(id).await?;
        let had_state = self.displays.remove(id);
        Ok(existed || had_state)
    }

    pub async fn set_max_pages(&self, max_pages: u32) -> anyhow::Result<()> {
        self.subscribers.set_max_pages(max_pages).await
    }

    /// Whether `id` may use the chat commands.
    pub async fn is_allowed(&self, id: SubscriberId) -> bool {
        self.subscribers.is_allowed(id).await
    }

    pub async fn allow(&self, id: SubscriberId) -> anyhow::Result<bool> {
        self.subscribers.allow(id).await
    }

    /// Revoke access. Monitoring stops from the next cycle; what was shown
    /// stays, as with [`Self::deactivate`].
    pub async fn disallow(&self, id: SubscriberId) -> anyhow::Result<bool> {
        self.subscribers.disallow(id).await
    }

    /// Pick up changes written to the store by another process.
    pub async fn reload_subscribers(self: &Arc<Self>) -> anyhow::Result<()> {
        let removed = self.subscribers.reload().await?;
        for id in removed {
            self.displays.remove(id);
            info!(subscriber_id = id, "subscriber removed from store");
        }

        if !self.subscribers.active_subscribers().await.is_empty() {
            self.ensure_polling().await;
        }
        Ok(())
    }

    /// Stop the loop after its current cycle. Later activations are ignored.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    // ------------------------------------------------------------------
    // Loop
    // ------------------------------------------------------------------

    async fn ensure_polling(self: &Arc<Self>) {
        if *self.shutdown.borrow() {
            return;
        }

        let mut state = self.state.lock().await;
        if *state == LoopState::Polling {
            return;
        }
        *state = LoopState::Polling;
        self.loops_started.fetch_add(1, Ordering::Relaxed);

        let this = Arc::clone(self);
        tokio::spawn(async move { this.poll_loop().await });
    }

    async fn poll_loop(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        info!(every_ms = self.cfg.poll_interval.as_millis() as u64, "monitor loop started");

        loop {
            // Decided under the state lock so an activation racing with the
            // exit either sees `Polling` after its flag is read here, or
            // `Idle` and starts a new loop.
            let active = {
                let mut state = self.state.lock().await;
                let active = self.subscribers.active_subscribers().await;
                if active.is_empty() || *shutdown.borrow() {
                    *state = LoopState::Idle;
                    break;
                }
                active
            };

            self.cycle_for(active).await;

            tokio::select! {
                _ = tokio::time::sleep(self.cfg.poll_interval) => {}
                _ = shutdown.changed() => {}
            }
        }

        info!("monitor loop idle");
    }

    /// Run one cycle for the currently active subscribers, independent of
    /// the loop.
    pub async fn run_cycle(&self) -> CycleReport {
        let active = self.subscribers.active_subscribers().await;
        self.cycle_for(active).await
    }

    async fn cycle_for(&self, active: Vec<Subscriber>) -> CycleReport {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        let trace_id = TraceId::new();
        let span = cycle_span(cycle, &trace_id);

        async move {
            let admin = self.subscribers.admin().await;
            let depth = active
                .iter()
                .map(|s| s.config.effective_pages(&admin))
                .max()
                .unwrap_or(1) as usize;

            let mut report = CycleReport {
                cycle,
                depth,
                subscribers: active.len(),
                ..Default::default()
            };

            let snapshot = match warn_if_slow("source.fetch", self.cfg.slow_fetch, self.source.fetch(depth)).await {
                Ok(set) => {
                    debug!(items = set.len(), fetched_at = %set.fetched_at(), "snapshot fetched");
                    set
                }
                Err(e) => {
                    warn!(depth, error = %e, "fetch failed; treating every item as absent this cycle");
                    report.fetch_failed = true;
                    SnapshotSet::empty()
                }
            };

            report.items = snapshot.len();
            Span::current().record("depth", depth);
            Span::current().record("items", snapshot.len());

            let snapshot = Arc::new(snapshot);
            let mut ids = Vec::with_capacity(active.len());
            let mut tasks = Vec::with_capacity(active.len());

            for sub in active {
                let pages = sub.config.effective_pages(&admin) as usize;
                let snapshot = Arc::clone(&snapshot);
                let sink = Arc::clone(&self.sink);
                let slot = self.displays.slot(sub.id);
                let slow_call = self.cfg.slow_sink_call;
                let span = child_span("reconcile", sub.id);

                ids.push(sub.id);
                tasks.push(tokio::spawn(
                    async move {
                        let matched = evaluate(snapshot.prefix(pages), &sub.config);
                        let mut state = slot.lock().await;
                        let ops = reconcile(sub.id, &matched, &state);
                        let outcome = apply(sink.as_ref(), sub.id, ops, &mut state, slow_call).await;

                        if outcome.total() > 0 {
                            debug!(
                                matched = matched.len(),
                                created = outcome.created,
                                updated = outcome.updated,
                                deleted = outcome.deleted,
                                failed = outcome.failed,
                                "subscriber reconciled"
                            );
                        }
                        outcome
                    }
                    .instrument(span),
                ));
            }

            for (id, joined) in ids.into_iter().zip(join_all(tasks).await) {
                match joined {
                    Ok(outcome) => report.outcome.merge(outcome),
                    Err(e) => {
                        report.panicked += 1;
                        error!(subscriber_id = id, error = %e, "reconciliation task failed");
                    }
                }
            }

            if report.outcome.total() > 0 || report.panicked > 0 {
                info!(
                    subscribers = report.subscribers,
                    created = report.outcome.created,
                    updated = report.outcome.updated,
                    deleted = report.outcome.deleted,
                    failed = report.outcome.failed,
                    panicked = report.panicked,
                    "cycle complete"
                );
            } else {
                debug!(subscribers = report.subscribers, "cycle complete, nothing changed");
            }

            report
        }
        .instrument(span)
        .await
    }
}
