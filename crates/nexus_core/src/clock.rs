//! Time source used by the store for timestamps and date rules.
//!
//! # Responsibility
//! - Provide "now" and "today" to every stamping/derivation path.
//! - Allow deterministic time in tests via [`ManualClock`].
//!
//! # Invariants
//! - All store timestamps are UTC.
//! - "today" is the UTC calendar date of `now()`.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current instant.
pub trait Clock: Send {
    /// Current UTC instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
///
/// Clones share the same instant, so a test can keep one handle and move
/// time forward while the store owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock frozen at `at`.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: Arc::new(AtomicI64::new(at.timestamp_millis())),
        }
    }

    /// Creates a clock frozen at midday UTC of the given date.
    ///
    /// Returns `None` for an invalid calendar date.
    pub fn at_date(year: i32, month: u32, day: u32) -> Option<Self> {
        let at = Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single()?;
        Some(Self::new(at))
    }

    /// Moves the clock forward (or backward for negative durations).
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    /// Jumps the clock to an absolute instant.
    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};
    use chrono::{Duration, NaiveDate};

    #[test]
    fn manual_clock_handles_share_time() {
        let clock = ManualClock::at_date(2024, 6, 15).expect("valid date");
        let handle = clock.clone();
        handle.advance(Duration::days(2));

        assert_eq!(
            clock.today(),
            NaiveDate::from_ymd_opt(2024, 6, 17).expect("valid date")
        );
    }

    #[test]
    fn at_date_rejects_invalid_calendar_date() {
        assert!(ManualClock::at_date(2024, 2, 30).is_none());
    }
}
