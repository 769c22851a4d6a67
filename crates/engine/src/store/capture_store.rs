use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Arc;

use super::bucket::CaptureBucket;
use super::retention::RetentionWindow;
use crate::capture::Capture;
use crate::clock::Clock;

/// Captures grouped by calendar date.
///
/// Reads are weakly consistent: a scan or count running next to inserts may
/// or may not see them, and `clear` racing an insert may drop that capture.
/// There is deliberately no store-wide lock, so ingestion never waits on
/// aggregation.
pub struct CaptureStore {
    buckets: DashMap<NaiveDate, Arc<CaptureBucket>>,
    clock: Arc<dyn Clock>,
}

impl CaptureStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            clock,
        }
    }

    pub fn insert(&self, capture: Capture) {
        let date = self.clock.date_of(capture.occurred_at);
        let bucket = match self.buckets.get(&date) {
            Some(existing) => Arc::clone(existing.value()),
            None => Arc::clone(self.buckets.entry(date).or_default().value()),
        };
        bucket.push(capture);
    }

    pub fn scan_all(&self) -> Vec<Capture> {
        self.bucket_handles()
            .into_iter()
            .flat_map(|(_, bucket)| bucket.snapshot())
            .collect()
    }

    pub fn count_records(&self) -> usize {
        self.buckets.iter().map(|b| b.value().len()).sum()
    }

    pub fn count_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&self) {
        self.buckets.clear();
    }

    pub fn bucket(&self, date: NaiveDate) -> Option<Arc<CaptureBucket>> {
        self.buckets.get(&date).map(|b| Arc::clone(b.value()))
    }

    pub fn retention_window(&self, past_days: u32) -> RetentionWindow {
        RetentionWindow::new(self.clock.today(), past_days)
    }

    /// Buckets inside `window`. Stale buckets are skipped, not removed.
    pub fn retained_buckets(&self, window: &RetentionWindow) -> Vec<(NaiveDate, Arc<CaptureBucket>)> {
        self.buckets
            .iter()
            .filter(|b| window.contains(*b.key()))
            .map(|b| (*b.key(), Arc::clone(b.value())))
            .collect()
    }

    fn bucket_handles(&self) -> Vec<(NaiveDate, Arc<CaptureBucket>)> {
        self.buckets
            .iter()
            .map(|b| (*b.key(), Arc::clone(b.value())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    fn store() -> CaptureStore {
        CaptureStore::new(Arc::new(FixedClock::new(now())))
    }

    #[test]
    fn insert_groups_by_date() {
        let s = store();
        s.insert(Capture::new(0.32, now()));
        s.insert(Capture::new(0.34, now() + Duration::minutes(5)));
        s.insert(Capture::new(0.71, now() - Duration::days(2)));

        assert_eq!(s.count_records(), 3);
        assert_eq!(s.count_buckets(), 2);
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        assert_eq!(s.bucket(today).unwrap().len(), 2);
    }

    #[test]
    fn same_instant_captures_are_both_kept() {
        let s = store();
        s.insert(Capture::new(0.1, now()));
        s.insert(Capture::new(0.2, now()));
        assert_eq!(s.count_records(), 2);
        assert_eq!(s.scan_all().len(), 2);
    }

    #[test]
    fn clear_empties_store() {
        let s = store();
        s.insert(Capture::new(0.32, now()));
        assert_eq!(s.scan_all().len(), 1);
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.scan_all().len(), 0);
        assert_eq!(s.count_records(), 0);
    }

    #[test]
    fn retention_boundary() {
        let s = store();
        s.insert(Capture::new(0.5, now() - Duration::days(30)));
        s.insert(Capture::new(0.6, now() - Duration::days(31)));
        s.insert(Capture::new(0.7, now() + Duration::days(1)));

        let window = s.retention_window(30);
        let kept: Vec<NaiveDate> = s.retained_buckets(&window).into_iter().map(|(d, _)| d).collect();
        assert_eq!(kept, vec![NaiveDate::from_ymd_opt(2024, 4, 20).unwrap()]);
        assert_eq!(s.count_buckets(), 3, "filtering must not delete buckets");
    }

    #[test]
    fn concurrent_inserts_are_all_counted() {
        let s = store();
        std::thread::scope(|scope| {
            for t in 0..8i64 {
                let s = &s;
                scope.spawn(move || {
                    for i in 0..500i64 {
                        let at = now() - Duration::days(t % 3) + Duration::seconds(i);
                        s.insert(Capture::new(0.5, at));
                    }
                });
            }
        });
        assert_eq!(s.count_records(), 4000);
        assert_eq!(s.count_buckets(), 3);
    }

    #[test]
    fn inserts_during_scan_become_visible() {
        let s = store();
        std::thread::scope(|scope| {
            let writer = scope.spawn(|| {
                for i in 0..2000i64 {
                    s.insert(Capture::new(0.4, now() - Duration::days(i % 40)));
                }
            });
            while !writer.is_finished() {
                let seen = s.scan_all().len();
                assert!(seen <= 2000);
            }
        });
        assert_eq!(s.scan_all().len(), 2000);
    }

    #[test]
    fn same_date_insert_does_not_wait_for_open_reader() {
        let s = store();
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        for i in 0..100i64 {
            s.insert(Capture::new(0.3, now() + Duration::seconds(i)));
        }
        let bucket = s.bucket(today).unwrap();

        std::thread::scope(|scope| {
            let mut reader = bucket.iter();
            assert!(reader.next().is_some());

            let (done_tx, done_rx) = std::sync::mpsc::channel();
            let s = &s;
            scope.spawn(move || {
                for i in 0..500i64 {
                    s.insert(Capture::new(0.9, now() + Duration::minutes(i % 60)));
                }
                let _ = done_tx.send(());
            });

            done_rx
                .recv_timeout(std::time::Duration::from_secs(5))
                .expect("same-date insert blocked behind a reader");
            drop(reader);
        });
        assert_eq!(s.count_records(), 600);
        assert_eq!(s.count_buckets(), 1);
    }
}
