use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::merge_bucket;
use super::MergeError;
use crate::pool::WorkerPool;
use crate::statistic::MergedRecord;
use crate::store::CaptureBucket;

pub const DEFAULT_CHUNK_SIZE: usize = 10;
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(200);

/// Fans retained buckets out to the worker pool in fixed-size chunks and
/// waits, bounded, for every chunk to report.
#[derive(Clone)]
pub struct ParallelMerge {
    pool: WorkerPool,
    chunk_size: usize,
    wait_timeout: Duration,
}

impl ParallelMerge {
    pub fn new(pool: WorkerPool, chunk_size: usize, wait_timeout: Duration) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
            wait_timeout,
        }
    }

    pub fn with_defaults(pool: WorkerPool) -> Self {
        Self::new(pool, DEFAULT_CHUNK_SIZE, DEFAULT_WAIT_TIMEOUT)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub(super) async fn merge(
        &self,
        buckets: Vec<(NaiveDate, Arc<CaptureBucket>)>,
    ) -> Result<Vec<MergedRecord>, MergeError> {
        self.merge_with(buckets, merge_bucket).await
    }

    async fn merge_with<F>(
        &self,
        buckets: Vec<(NaiveDate, Arc<CaptureBucket>)>,
        merge_one: F,
    ) -> Result<Vec<MergedRecord>, MergeError>
    where
        F: Fn(NaiveDate, &CaptureBucket) -> Result<MergedRecord, MergeError> + Copy + Send + 'static,
    {
        if buckets.is_empty() {
            return Ok(Vec::new());
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<Result<Vec<MergedRecord>, MergeError>>();
        let mut expected = 0usize;
        for chunk in buckets.chunks(self.chunk_size) {
            let chunk = chunk.to_vec();
            let tx = tx.clone();
            let submitted = self.pool.submit(move || {
                let merged = chunk
                    .iter()
                    .map(|(date, bucket)| merge_one(*date, bucket))
                    .collect();
                // The receiver is gone once the caller gave up waiting.
                let _ = tx.send(merged);
            });
            if let Err(e) = submitted {
                tracing::warn!(error = %e, submitted = expected, "merge job rejected by worker pool");
                return Err(e.into());
            }
            expected += 1;
        }
        drop(tx);

        let mut received = 0usize;
        let mut merged = Vec::with_capacity(buckets.len());
        let outcome = tokio::time::timeout(self.wait_timeout, async {
            while received < expected {
                match rx.recv().await {
                    Some(chunk) => {
                        merged.extend(chunk?);
                        received += 1;
                    }
                    None => {
                        return Err(MergeError::Interrupted {
                            pending: expected - received,
                        })
                    }
                }
            }
            Ok(())
        })
        .await;

        match outcome {
            Ok(Ok(())) => Ok(merged),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(MergeError::Timeout {
                waited: self.wait_timeout,
                pending: expected - received,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Capture;
    use chrono::{TimeZone, Utc};

    fn buckets(days: u32) -> Vec<(NaiveDate, Arc<CaptureBucket>)> {
        (1..=days)
            .map(|d| {
                let at = Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap();
                let date = at.date_naive();
                (date, Arc::new(CaptureBucket::with_first(Capture::new(0.5, at))))
            })
            .collect()
    }

    fn panic_on_third(date: NaiveDate, bucket: &CaptureBucket) -> Result<MergedRecord, MergeError> {
        if date == NaiveDate::from_ymd_opt(2024, 5, 3).unwrap() {
            panic!("bucket merge blew up");
        }
        merge_bucket(date, bucket)
    }

    #[test]
    fn defaults() {
        let merge = ParallelMerge::with_defaults(WorkerPool::new(1, 1));
        assert_eq!(merge.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert_eq!(merge.wait_timeout(), DEFAULT_WAIT_TIMEOUT);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let merge = ParallelMerge::new(WorkerPool::new(1, 1), 0, Duration::from_millis(10));
        assert_eq!(merge.chunk_size(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panicking_chunk_is_reported_as_interrupted() {
        let merge = ParallelMerge::new(WorkerPool::new(4, 16), 2, Duration::from_secs(2));

        let err = merge.merge_with(buckets(6), panic_on_third).await.unwrap_err();
        assert_eq!(err, MergeError::Interrupted { pending: 1 });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn closing_pool_drops_queued_chunks() {
        let pool = WorkerPool::new(1, 16);
        pool.submit(|| std::thread::sleep(Duration::from_millis(300))).unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let closer = pool.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            closer.close();
        });

        let merge = ParallelMerge::new(pool, 2, Duration::from_secs(2));
        let err = merge.merge(buckets(5)).await.unwrap_err();
        assert_eq!(err, MergeError::Interrupted { pending: 3 });
    }
}
