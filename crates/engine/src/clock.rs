use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use parking_lot::RwLock;

/// Source of "now" and of the zone used to derive calendar dates.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    fn offset(&self) -> FixedOffset;

    fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset()).date_naive()
    }

    fn today(&self) -> NaiveDate {
        self.date_of(self.now())
    }
}

#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn utc() -> Self {
        Self::with_offset(utc_offset())
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
            offset: utc_offset(),
        }
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_reports_pinned_instant() {
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());

        clock.advance(chrono::Duration::days(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 21).unwrap());
    }

    #[test]
    fn date_follows_offset() {
        let at = Utc.with_ymd_and_hms(2024, 5, 20, 23, 30, 0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let clock = FixedClock::new(at).with_offset(plus_two);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 21).unwrap());

        let utc = FixedClock::new(at);
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2024, 5, 20).unwrap());
    }

    #[test]
    fn system_clock_defaults_to_utc() {
        assert_eq!(SystemClock::default().offset().local_minus_utc(), 0);
    }
}
