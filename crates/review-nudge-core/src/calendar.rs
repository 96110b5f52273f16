//! Clock capability and calendar-day arithmetic.
//!
//! Day counts in the gate are differences between local calendar dates
//! (midnight to midnight), not elapsed seconds divided by 86400. Two
//! instants twenty minutes apart across midnight are one day apart.

use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

/// Source of "now" and of the evaluator's local calendar.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date of `instant` in the evaluator's local time zone.
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// Wall clock in the system's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock with a fixed UTC offset, for simulation and tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    /// A clock frozen at `now`, using UTC as the local calendar.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

/// Whole calendar days from `from` to `to` in the clock's local calendar.
///
/// Negative when `to` falls on an earlier date than `from`.
pub fn calendar_days_between(clock: &dyn Clock, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (clock.local_date(to) - clock.local_date(from)).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn same_day_is_zero() {
        let clock = FixedClock::new(utc(2026, 3, 1, 0, 0));
        assert_eq!(
            calendar_days_between(&clock, utc(2026, 3, 1, 0, 5), utc(2026, 3, 1, 23, 55)),
            0
        );
    }

    #[test]
    fn crossing_midnight_counts_a_day() {
        let clock = FixedClock::new(utc(2026, 3, 1, 0, 0));
        let days = calendar_days_between(&clock, utc(2026, 3, 1, 23, 50), utc(2026, 3, 2, 0, 10));
        assert_eq!(days, 1);
    }

    #[test]
    fn two_calendar_days_under_two_elapsed_days() {
        // 24h40m elapsed, floor(secs / 86400) would say 1
        let clock = FixedClock::new(utc(2026, 3, 1, 0, 0));
        let from = utc(2026, 3, 1, 23, 30);
        let to = utc(2026, 3, 3, 0, 10);
        assert_eq!((to - from).num_days(), 1);
        assert_eq!(calendar_days_between(&clock, from, to), 2);
    }

    #[test]
    fn local_offset_moves_the_boundary() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let clock = FixedClock::with_offset(utc(2026, 1, 1, 0, 0), tokyo);
        // 14:30Z is 23:30 local, 15:30Z is 00:30 local the next day
        assert_eq!(
            calendar_days_between(&clock, utc(2026, 1, 1, 14, 30), utc(2026, 1, 1, 15, 30)),
            1
        );
        let utc_clock = FixedClock::new(utc(2026, 1, 1, 0, 0));
        assert_eq!(
            calendar_days_between(&utc_clock, utc(2026, 1, 1, 14, 30), utc(2026, 1, 1, 15, 30)),
            0
        );
    }

    #[test]
    fn backwards_is_negative() {
        let clock = FixedClock::new(utc(2026, 3, 1, 0, 0));
        assert_eq!(
            calendar_days_between(&clock, utc(2026, 3, 5, 12, 0), utc(2026, 3, 3, 12, 0)),
            -2
        );
    }

    #[test]
    fn fixed_clock_advances() {
        let clock = FixedClock::new(utc(2026, 3, 1, 12, 0));
        clock.advance(Duration::days(3));
        assert_eq!(clock.now(), utc(2026, 3, 4, 12, 0));
        clock.set(utc(2027, 1, 1, 0, 0));
        assert_eq!(clock.now(), utc(2027, 1, 1, 0, 0));
    }
}
