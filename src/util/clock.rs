use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of wall-clock timestamps for version stamps and table metadata.
///
/// Every cell write and every `modified` update goes through a `Clock`, which
/// lets tests drive time explicitly instead of sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Returns `now` if it is strictly after `last`, otherwise the smallest
/// representable step after `last`.
///
/// Stamps carry microsecond precision, so the step is one microsecond.
pub fn next_after(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = truncate_micros(now);
    match last {
        Some(last) if now <= last => last + Duration::microseconds(1),
        _ => now,
    }
}

fn truncate_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = ts.timestamp_subsec_nanos();
    ts - Duration::nanoseconds(i64::from(nanos % 1_000))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let start = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), start + Duration::seconds(5));
    }

    #[test]
    fn test_next_after_is_strictly_increasing() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();

        assert_eq!(next_after(ts, None), ts);
        assert_eq!(next_after(ts, Some(ts)), ts + Duration::microseconds(1));
        assert_eq!(
            next_after(ts - Duration::seconds(1), Some(ts)),
            ts + Duration::microseconds(1)
        );
        assert_eq!(next_after(ts + Duration::seconds(1), Some(ts)), ts + Duration::seconds(1));
    }

    #[test]
    fn test_next_after_drops_sub_microsecond_precision() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let stamped = next_after(ts, None);
        assert_eq!(stamped.timestamp_subsec_nanos(), 123_456_000);
    }
}
