use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single vegetation reading. Two captures taken at the same instant compare
/// equal even when their values differ.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Capture {
    pub vegetation: f64,
    pub occurred_at: DateTime<Utc>,
}

impl Capture {
    pub fn new(vegetation: f64, occurred_at: DateTime<Utc>) -> Self {
        Self {
            vegetation,
            occurred_at,
        }
    }
}

impl PartialEq for Capture {
    fn eq(&self, other: &Self) -> bool {
        self.occurred_at == other.occurred_at
    }
}

impl Eq for Capture {}

impl Hash for Capture {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.occurred_at.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn equality_uses_instant_only() {
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap();
        let a = Capture::new(0.32, at);
        let b = Capture::new(0.91, at);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(!set.insert(b));
    }

    #[test]
    fn different_instants_differ() {
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 8, 0, 0).unwrap();
        let a = Capture::new(0.32, at);
        let b = Capture::new(0.32, at + chrono::Duration::seconds(1));
        assert_ne!(a, b);
    }
}
