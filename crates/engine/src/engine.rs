use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::StatisticCache;
use crate::capture::Capture;
use crate::clock::Clock;
use crate::config::{self, EngineConfig, LoadError};
use crate::health::{HealthReport, HealthTracker};
use crate::merge::{MergeStrategy, ParallelMerge};
use crate::metrics::{render_prometheus, EngineMetrics, Gauges};
use crate::pool::{PoolError, WorkerPool};
use crate::scheduler::{RecomputeScheduler, SchedulerHandle, ShutdownOutcome};
use crate::statistic::VegetationStatistic;
use crate::store::CaptureStore;

/// Owns the store, the recompute loop and everything they share.
///
/// Ingestion and reads go through `insert` and `current_statistic`; neither
/// ever waits on the scheduler. Must be started inside a tokio runtime.
pub struct Engine {
    store: Arc<CaptureStore>,
    cache: StatisticCache,
    health: HealthTracker,
    metrics: Arc<EngineMetrics>,
    pool: WorkerPool,
    scheduler: SchedulerHandle,
}

impl Engine {
    pub fn start(config: &EngineConfig, clock: Arc<dyn Clock>) -> Result<Self, LoadError> {
        config::validate(config)?;

        let store = Arc::new(CaptureStore::new(Arc::clone(&clock)));
        let pool = WorkerPool::new(config.workers.max_workers, config.workers.queue_capacity);
        let strategy = if config.merge.parallel {
            MergeStrategy::Parallel(ParallelMerge::new(
                pool.clone(),
                config.merge.chunk_size,
                config.merge.wait_timeout(),
            ))
        } else {
            MergeStrategy::Sequential
        };
        let (cache, publisher) = StatisticCache::new();
        let health = HealthTracker::new();
        let metrics = EngineMetrics::new();

        tracing::info!(
            strategy = strategy.name(),
            past_days = config.past_days,
            bucket_threshold = config.housekeeping.bucket_threshold,
            max_workers = pool.max_workers(),
            "starting engine"
        );

        let scheduler = RecomputeScheduler::new(
            Arc::clone(&store),
            strategy,
            publisher,
            health.clone(),
            clock,
        )
        .with_past_days(config.past_days)
        .with_bucket_threshold(config.housekeeping.bucket_threshold)
        .with_metrics(Arc::clone(&metrics))
        .spawn(config.scheduler.initial_delay(), config.scheduler.fixed_delay());

        Ok(Self {
            store,
            cache,
            health,
            metrics,
            pool,
            scheduler,
        })
    }

    pub fn insert(&self, capture: Capture) {
        let started = Instant::now();
        self.store.insert(capture);
        self.metrics.inc_captures_inserted();
        self.metrics.record_insert_latency(started);
    }

    /// Hands the insert to the shared worker pool so a burst of captures
    /// does not occupy the caller. Fails only when the pool is closed or its
    /// queue is full.
    pub fn submit_insert(&self, capture: Capture) -> Result<(), PoolError> {
        let store = Arc::clone(&self.store);
        let metrics = Arc::clone(&self.metrics);
        let queued_at = Instant::now();
        self.pool.submit(move || {
            store.insert(capture);
            metrics.inc_captures_inserted();
            metrics.record_insert_latency(queued_at);
        })
    }

    /// Last published statistic; all zeros until the first successful tick.
    pub fn current_statistic(&self) -> VegetationStatistic {
        let started = Instant::now();
        let statistic = self.cache.current();
        self.metrics.inc_statistic_reads();
        self.metrics.record_read_latency(started);
        statistic
    }

    pub fn health(&self) -> HealthReport {
        self.health.current_health()
    }

    pub fn store(&self) -> &Arc<CaptureStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn render_metrics(&self) -> String {
        render_prometheus(
            &self.metrics,
            Gauges {
                buckets: self.store.count_buckets(),
                records: self.store.count_records(),
                workers_active: self.pool.active(),
                workers_queued: self.pool.queued(),
            },
        )
    }

    /// Stops the recompute loop (see `SchedulerHandle::shutdown`), then closes
    /// the worker pool. Jobs still queued in the pool are dropped.
    pub async fn shutdown(self, grace: Duration) -> ShutdownOutcome {
        let outcome = self.scheduler.shutdown(grace).await;
        self.pool.close();
        tracing::info!(?outcome, "engine stopped");
        outcome
    }
}
