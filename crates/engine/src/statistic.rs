use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::math::{scale, ScaleError, VEGETATION_SCALE};

/// One day's captures reduced to their average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub average_vegetation: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VegetationStatistic {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl VegetationStatistic {
    /// Summarises already window-filtered daily records. Returns `None` when
    /// there is nothing to summarise.
    pub fn from_merged(records: &[MergedRecord]) -> Result<Option<Self>, ScaleError> {
        if records.is_empty() {
            return Ok(None);
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for r in records {
            min = min.min(r.average_vegetation);
            max = max.max(r.average_vegetation);
            sum += r.average_vegetation;
        }
        let avg = scale(sum / records.len() as f64, VEGETATION_SCALE)?;

        Ok(Some(Self { min, max, avg }))
    }
}
