use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::scheduler::TickError;

#[derive(Debug, Clone, Default)]
pub struct HealthRecord {
    pub last_error: Option<Arc<TickError>>,
    pub last_error_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub last_error: Option<String>,
    pub last_error_at: Option<DateTime<Utc>>,
}

impl HealthReport {
    /// Flat key/value view for liveness endpoints.
    pub fn details(&self) -> BTreeMap<&'static str, String> {
        let mut details = BTreeMap::new();
        if self.healthy {
            details.insert("calculator-is-healthy", "YES".to_string());
            return details;
        }
        details.insert("calculator-is-healthy", "NO".to_string());
        if let Some(at) = self.last_error_at {
            details.insert("time-occurred-error", at.to_rfc3339());
        }
        if let Some(err) = &self.last_error {
            details.insert("error", err.clone());
        }
        details
    }
}

/// Last failure of the recompute loop.
///
/// Errors are sticky: once recorded the tracker stays unhealthy until the
/// process restarts, even if later ticks succeed.
#[derive(Clone)]
pub struct HealthTracker {
    record: Arc<ArcSwap<HealthRecord>>,
}

impl Default for HealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthTracker {
    pub fn new() -> Self {
        Self {
            record: Arc::new(ArcSwap::from_pointee(HealthRecord::default())),
        }
    }

    pub fn record_error(&self, error: TickError, observed_at: DateTime<Utc>) {
        self.record.store(Arc::new(HealthRecord {
            last_error: Some(Arc::new(error)),
            last_error_at: Some(observed_at),
        }));
    }

    pub fn record(&self) -> HealthRecord {
        HealthRecord::clone(&self.record.load())
    }

    pub fn current_health(&self) -> HealthReport {
        let record = self.record.load();
        HealthReport {
            healthy: record.last_error.is_none(),
            last_error: record.last_error.as_ref().map(|e| e.to_string()),
            last_error_at: record.last_error_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeError;
    use chrono::TimeZone;
    use std::time::Duration;

    fn timeout() -> TickError {
        TickError::Merge(MergeError::Timeout {
            waited: Duration::from_millis(200),
            pending: 2,
        })
    }

    #[test]
    fn starts_healthy() {
        let tracker = HealthTracker::new();
        let report = tracker.current_health();
        assert!(report.healthy);
        assert_eq!(report.last_error, None);
        assert_eq!(report.details().get("calculator-is-healthy").unwrap(), "YES");
    }

    #[test]
    fn error_is_sticky_and_latest_wins() {
        let tracker = HealthTracker::new();
        let first = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let second = first + chrono::Duration::minutes(1);

        tracker.record_error(timeout(), first);
        tracker.record_error(TickError::Panicked("boom".into()), second);

        let report = tracker.current_health();
        assert!(!report.healthy);
        assert_eq!(report.last_error_at, Some(second));
        assert!(report.last_error.unwrap().contains("boom"));
        assert!(!tracker.current_health().healthy);
    }

    #[test]
    fn details_describe_failure() {
        let tracker = HealthTracker::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        tracker.record_error(timeout(), at);

        let details = tracker.current_health().details();
        assert_eq!(details["calculator-is-healthy"], "NO");
        assert_eq!(details["time-occurred-error"], "2024-05-20T12:00:00+00:00");
        assert!(details["error"].contains("200ms"));
    }

    #[test]
    fn clones_share_state() {
        let a = HealthTracker::new();
        let b = a.clone();
        a.record_error(timeout(), Utc::now());
        assert!(b.record().last_error.is_some());
    }

    #[test]
    fn report_serializes() {
        let json = serde_json::to_value(HealthTracker::new().current_health()).unwrap();
        assert_eq!(json["healthy"], true);
        assert!(json["last_error"].is_null());
    }
}
