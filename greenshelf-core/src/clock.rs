//! Wall-clock access, injectable so tests can pin "today".

use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day used for all day-count arithmetic.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Frozen at 08:00 UTC on `day`.
    pub fn on(day: NaiveDate) -> Self {
        let now = day
            .and_hms_opt(8, 0, 0)
            .unwrap_or_else(|| day.and_time(NaiveTime::default()))
            .and_utc();
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Starts at 08:00 UTC on `day`.
    pub fn on(day: NaiveDate) -> Self {
        Self {
            now: Mutex::new(FixedClock::on(day).now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_day() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let clock = FixedClock::on(day);
        assert_eq!(clock.today(), day);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn manual_clock_advances_by_days() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let clock = ManualClock::on(day);
        assert_eq!(clock.today(), day);
        clock.advance(Duration::days(4));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
    }
}
