use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
pub struct LatencySummary {
    sum_us: AtomicU64,
    count: AtomicU64,
}

impl LatencySummary {
    pub fn record(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.sum_us.fetch_add(us, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn vals(&self) -> (u64, u64) {
        (
            self.sum_us.load(Ordering::Relaxed),
            self.count.load(Ordering::Relaxed),
        )
    }
}

#[derive(Debug, Default)]
pub struct EngineMetrics {
    captures_inserted: AtomicU64,
    statistic_reads: AtomicU64,
    ticks_published: AtomicU64,
    ticks_skipped: AtomicU64,
    ticks_failed: AtomicU64,
    housekeeping_clears: AtomicU64,
    insert_latency: LatencySummary,
    read_latency: LatencySummary,
    merge_latency: LatencySummary,
}

impl EngineMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_captures_inserted(&self) {
        self.captures_inserted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_statistic_reads(&self) {
        self.statistic_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ticks_published(&self) {
        self.ticks_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ticks_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ticks_failed(&self) {
        self.ticks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_housekeeping_clears(&self) {
        self.housekeeping_clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_insert_latency(&self, start: Instant) {
        self.insert_latency.record(start);
    }

    pub fn record_read_latency(&self, start: Instant) {
        self.read_latency.record(start);
    }

    pub fn record_merge_latency(&self, start: Instant) {
        self.merge_latency.record(start);
    }

    pub fn captures_inserted_val(&self) -> u64 {
        self.captures_inserted.load(Ordering::Relaxed)
    }

    pub fn statistic_reads_val(&self) -> u64 {
        self.statistic_reads.load(Ordering::Relaxed)
    }

    pub fn ticks_published_val(&self) -> u64 {
        self.ticks_published.load(Ordering::Relaxed)
    }

    pub fn ticks_skipped_val(&self) -> u64 {
        self.ticks_skipped.load(Ordering::Relaxed)
    }

    pub fn ticks_failed_val(&self) -> u64 {
        self.ticks_failed.load(Ordering::Relaxed)
    }

    pub fn housekeeping_clears_val(&self) -> u64 {
        self.housekeeping_clears.load(Ordering::Relaxed)
    }

    pub fn insert_latency_vals(&self) -> (u64, u64) {
        self.insert_latency.vals()
    }

    pub fn read_latency_vals(&self) -> (u64, u64) {
        self.read_latency.vals()
    }

    pub fn merge_latency_vals(&self) -> (u64, u64) {
        self.merge_latency.vals()
    }
}
