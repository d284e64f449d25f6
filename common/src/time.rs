//! Time utilities for xrate.

use chrono::{DateTime, Utc};

/// A timestamp with timezone (always UTC for xrate).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Calendar date label (`YYYY-MM-DD`) for a timestamp.
pub fn date_label(timestamp: Timestamp) -> String {
    timestamp.date_naive().format("%Y-%m-%d").to_string()
}

/// Whole seconds elapsed between `since` and `now`, clamped at zero.
pub fn age_seconds(since: Timestamp, now: Timestamp) -> i64 {
    (now - since).num_seconds().max(0)
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        now()
    }
}

/// Clock that only moves when told to.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug)]
pub struct ManualClock {
    current: parking_lot::Mutex<Timestamp>,
}

#[cfg(any(test, feature = "test-utils"))]
impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: parking_lot::Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        *self.current.lock() += by;
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_date_label() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap();
        assert_eq!(date_label(ts), "2026-02-28");
    }

    #[test]
    fn test_age_seconds_clamps_future() {
        let base = now();
        assert_eq!(age_seconds(base, base + Duration::seconds(42)), 42);
        assert_eq!(age_seconds(base + Duration::seconds(5), base), 0);
    }

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }
}
