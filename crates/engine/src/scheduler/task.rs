use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use super::TickError;
use crate::cache::StatisticPublisher;
use crate::clock::Clock;
use crate::health::HealthTracker;
use crate::merge::MergeStrategy;
use crate::metrics::EngineMetrics;
use crate::statistic::VegetationStatistic;
use crate::store::CaptureStore;

pub const DEFAULT_BUCKET_THRESHOLD: usize = 200;
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(60);
const DEFAULT_PAST_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Published {
        statistic: VegetationStatistic,
        cleared: bool,
    },
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    Graceful,
    Forced,
}

/// Recomputes the published statistic from the store. Sole owner of the
/// cache's publisher and sole writer of the health tracker.
pub struct RecomputeScheduler {
    store: Arc<CaptureStore>,
    strategy: MergeStrategy,
    publisher: StatisticPublisher,
    health: HealthTracker,
    clock: Arc<dyn Clock>,
    metrics: Arc<EngineMetrics>,
    past_days: u32,
    bucket_threshold: usize,
}

impl RecomputeScheduler {
    pub fn new(
        store: Arc<CaptureStore>,
        strategy: MergeStrategy,
        publisher: StatisticPublisher,
        health: HealthTracker,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            strategy,
            publisher,
            health,
            clock,
            metrics: EngineMetrics::new(),
            past_days: DEFAULT_PAST_DAYS,
            bucket_threshold: DEFAULT_BUCKET_THRESHOLD,
        }
    }

    pub fn with_past_days(mut self, past_days: u32) -> Self {
        self.past_days = past_days;
        self
    }

    pub fn with_bucket_threshold(mut self, threshold: usize) -> Self {
        self.bucket_threshold = threshold;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// One recompute pass without the error boundary.
    pub async fn tick(&self) -> Result<TickOutcome, TickError> {
        let started = Instant::now();
        let merged = self
            .strategy
            .compute_merged_records(&self.store, self.past_days)
            .await?;
        self.metrics.record_merge_latency(started);

        let Some(statistic) = VegetationStatistic::from_merged(&merged)? else {
            return Ok(TickOutcome::Skipped);
        };
        self.publisher.publish(statistic);

        let buckets = self.store.count_buckets();
        let cleared = buckets > self.bucket_threshold;
        if cleared {
            self.store.clear();
            tracing::info!(
                buckets,
                threshold = self.bucket_threshold,
                "bucket threshold exceeded, store cleared"
            );
        }

        Ok(TickOutcome::Published { statistic, cleared })
    }

    /// Runs one tick in its own task so that neither an error nor a panic can
    /// escape. Failures are logged, counted and recorded in the health tracker.
    pub async fn run_guarded(self: &Arc<Self>) -> Result<TickOutcome, TickError> {
        let this = Arc::clone(self);
        let mut tick = JoinSet::new();
        tick.spawn(async move { this.tick().await });

        let result = match tick.join_next().await {
            Some(Ok(result)) => result,
            Some(Err(join_err)) => Err(TickError::from(join_err)),
            None => Err(TickError::Cancelled),
        };

        match &result {
            Ok(TickOutcome::Published { statistic, cleared }) => {
                self.metrics.inc_ticks_published();
                if *cleared {
                    self.metrics.inc_housekeeping_clears();
                }
                tracing::debug!(
                    min = statistic.min,
                    max = statistic.max,
                    avg = statistic.avg,
                    "statistic published"
                );
            }
            Ok(TickOutcome::Skipped) => {
                self.metrics.inc_ticks_skipped();
                tracing::debug!("no captures in window, tick skipped");
            }
            Err(e) => {
                self.metrics.inc_ticks_failed();
                tracing::error!(
                    error = %e,
                    strategy = self.strategy.name(),
                    "critical error during calculation of field statistics"
                );
                self.health.record_error(e.clone(), self.clock.now());
            }
        }
        result
    }

    /// Starts the fixed-delay loop: wait `initial_delay`, then tick, then wait
    /// `fixed_delay` after each tick finishes. Ticks never overlap.
    pub fn spawn(self, initial_delay: Duration, fixed_delay: Duration) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let scheduler = Arc::new(self);

        let handle = tokio::spawn(async move {
            tracing::info!(
                strategy = scheduler.strategy.name(),
                past_days = scheduler.past_days,
                initial_delay_ms = initial_delay.as_millis() as u64,
                fixed_delay_ms = fixed_delay.as_millis() as u64,
                "recompute scheduler started"
            );
            if !wait_or_stop(initial_delay, &mut stop_rx).await {
                loop {
                    let _ = scheduler.run_guarded().await;
                    if wait_or_stop(fixed_delay, &mut stop_rx).await {
                        break;
                    }
                }
            }
            tracing::info!("recompute scheduler stopped");
        });

        SchedulerHandle {
            stop: stop_tx,
            handle,
        }
    }
}

/// Sleeps for `delay` unless a stop is requested first. Returns true to stop.
async fn wait_or_stop(delay: Duration, stop_rx: &mut watch::Receiver<bool>) -> bool {
    if *stop_rx.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => *stop_rx.borrow(),
        changed = stop_rx.changed() => changed.is_err() || *stop_rx.borrow(),
    }
}

/// Running scheduler. Dropping it without `shutdown` also stops the loop
/// after the current tick.
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops scheduling new ticks and waits up to `grace` for the in-flight
    /// one. Past the grace period the loop and its tick are aborted.
    pub async fn shutdown(mut self, grace: Duration) -> ShutdownOutcome {
        let _ = self.stop.send(true);

        if tokio::time::timeout(grace, &mut self.handle).await.is_ok() {
            return ShutdownOutcome::Graceful;
        }

        tracing::warn!(
            grace_ms = grace.as_millis() as u64,
            "in-flight tick did not finish in time, cancelling"
        );
        self.handle.abort();
        if tokio::time::timeout(grace, &mut self.handle).await.is_err() {
            tracing::warn!("recompute scheduler did not terminate");
        }
        ShutdownOutcome::Forced
    }
}
