use chrono::NaiveDate;

/// The trailing range of dates that counts as "current": `today` back to
/// `today - past_days`, both ends inclusive. Future dates fall outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionWindow {
    pub today: NaiveDate,
    pub past_days: u32,
}

impl RetentionWindow {
    pub fn new(today: NaiveDate, past_days: u32) -> Self {
        Self { today, past_days }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let days_back = (self.today - date).num_days();
        days_back >= 0 && days_back <= i64::from(self.past_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn boundary_is_inclusive() {
        let w = RetentionWindow::new(day(2024, 5, 20), 30);
        assert!(w.contains(day(2024, 5, 20)));
        assert!(w.contains(day(2024, 4, 20)));
        assert!(!w.contains(day(2024, 4, 19)));
    }

    #[test]
    fn future_dates_excluded() {
        let w = RetentionWindow::new(day(2024, 5, 20), 30);
        assert!(!w.contains(day(2024, 5, 21)));
    }

    #[test]
    fn zero_days_keeps_today_only() {
        let w = RetentionWindow::new(day(2024, 1, 1), 0);
        assert!(w.contains(day(2024, 1, 1)));
        assert!(!w.contains(day(2023, 12, 31)));
    }
}
