use chrono::NaiveDate;
use std::sync::Arc;

use super::merge_bucket;
use super::MergeError;
use crate::statistic::MergedRecord;
use crate::store::CaptureBucket;

pub(super) fn merge(buckets: &[(NaiveDate, Arc<CaptureBucket>)]) -> Result<Vec<MergedRecord>, MergeError> {
    let mut merged = Vec::with_capacity(buckets.len());
    for (date, bucket) in buckets {
        merged.push(merge_bucket(*date, bucket)?);
    }
    Ok(merged)
}
