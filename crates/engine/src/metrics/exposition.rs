use std::sync::Arc;

use super::engine_metrics::EngineMetrics;

/// Point-in-time sizes sampled alongside the counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gauges {
    pub buckets: usize,
    pub records: usize,
    pub workers_active: usize,
    pub workers_queued: usize,
}

pub fn render_prometheus(m: &Arc<EngineMetrics>, gauges: Gauges) -> String {
    let mut out = String::with_capacity(1024);

    write_counter(&mut out, "fieldstat_captures_inserted_total", m.captures_inserted_val());
    write_counter(&mut out, "fieldstat_statistic_reads_total", m.statistic_reads_val());
    write_counter(&mut out, "fieldstat_ticks_published_total", m.ticks_published_val());
    write_counter(&mut out, "fieldstat_ticks_skipped_total", m.ticks_skipped_val());
    write_counter(&mut out, "fieldstat_ticks_failed_total", m.ticks_failed_val());
    write_counter(&mut out, "fieldstat_housekeeping_clears_total", m.housekeeping_clears_val());

    let (sum, count) = m.insert_latency_vals();
    write_summary(&mut out, "fieldstat_insert_latency_us", sum, count);

    let (sum, count) = m.read_latency_vals();
    write_summary(&mut out, "fieldstat_read_latency_us", sum, count);

    let (sum, count) = m.merge_latency_vals();
    write_summary(&mut out, "fieldstat_merge_latency_us", sum, count);

    write_gauge(&mut out, "fieldstat_buckets", gauges.buckets as u64);
    write_gauge(&mut out, "fieldstat_records", gauges.records as u64);
    write_gauge(&mut out, "fieldstat_workers_active", gauges.workers_active as u64);
    write_gauge(&mut out, "fieldstat_workers_queued", gauges.workers_queued as u64);

    out
}

fn write_counter(out: &mut String, name: &str, val: u64) {
    use std::fmt::Write;
    let _ = writeln!(out, "# TYPE {name} counter");
    let _ = writeln!(out, "{name} {val}");
}

fn write_gauge(out: &mut String, name: &str, val: u64) {
    use std::fmt::Write;
    let _ = writeln!(out, "# TYPE {name} gauge");
    let _ = writeln!(out, "{name} {val}");
}

fn write_summary(out: &mut String, name: &str, sum: u64, count: u64) {
    use std::fmt::Write;
    let _ = writeln!(out, "# TYPE {name} summary");
    let _ = writeln!(out, "{name}_sum {sum}");
    let _ = writeln!(out, "{name}_count {count}");
}
