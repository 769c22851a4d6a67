mod error;
mod parallel;
mod sequential;

pub use error::MergeError;
pub use parallel::{ParallelMerge, DEFAULT_CHUNK_SIZE, DEFAULT_WAIT_TIMEOUT};

use chrono::NaiveDate;
use std::time::Instant;

use crate::statistic::MergedRecord;
use crate::store::{CaptureBucket, CaptureStore};

/// How daily buckets are reduced to merged records. Chosen once at
/// construction; both variants yield the same records for the same input.
#[derive(Clone)]
pub enum MergeStrategy {
    Sequential,
    Parallel(ParallelMerge),
}

impl MergeStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel(_) => "parallel",
        }
    }

    /// One record per retained day, newest first.
    pub async fn compute_merged_records(
        &self,
        store: &CaptureStore,
        past_days: u32,
    ) -> Result<Vec<MergedRecord>, MergeError> {
        if store.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let window = store.retention_window(past_days);
        let buckets = store.retained_buckets(&window);

        let mut records = match self {
            Self::Sequential => sequential::merge(&buckets)?,
            Self::Parallel(p) => p.merge(buckets).await?,
        };
        records.retain(|r| window.contains(r.date));
        records.sort_by(|a, b| b.date.cmp(&a.date));

        tracing::trace!(
            strategy = self.name(),
            records = records.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "merged captures"
        );
        Ok(records)
    }
}

fn merge_bucket(date: NaiveDate, bucket: &CaptureBucket) -> Result<MergedRecord, MergeError> {
    Ok(MergedRecord {
        date,
        average_vegetation: bucket.average()?,
    })
}
