use std::fmt;

use crate::capture::Capture;
use crate::math::{scaled_mean, ScaleError, VEGETATION_SCALE};

/// Append-only sequence of the captures that fall on one calendar date.
///
/// Appends never take a lock and never move existing entries, so same-date
/// inserts proceed while a scan or merge is walking the bucket. Readers see
/// a weakly consistent view: entries pushed mid-iteration may be missed.
pub struct CaptureBucket {
    captures: boxcar::Vec<Capture>,
}

impl Default for CaptureBucket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CaptureBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureBucket")
            .field("len", &self.len())
            .finish()
    }
}

impl CaptureBucket {
    pub fn new() -> Self {
        Self {
            captures: boxcar::Vec::new(),
        }
    }

    pub fn with_first(capture: Capture) -> Self {
        let bucket = Self::new();
        bucket.push(capture);
        bucket
    }

    pub fn push(&self, capture: Capture) {
        self.captures.push(capture);
    }

    pub fn len(&self) -> usize {
        self.captures.count()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capture> + '_ {
        self.captures.iter().map(|(_, capture)| capture)
    }

    pub fn snapshot(&self) -> Vec<Capture> {
        self.iter().copied().collect()
    }

    /// Mean vegetation of the bucket scaled to two decimals; 0 when empty.
    pub fn average(&self) -> Result<f64, ScaleError> {
        scaled_mean(self.iter().map(|c| c.vegetation), VEGETATION_SCALE)
    }
}
