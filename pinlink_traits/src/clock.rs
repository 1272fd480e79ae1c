use chrono::{NaiveTime, TimeDelta};

/// Wall-clock abstraction used to stamp panel log lines.
///
/// - time_of_day(): local time of day
/// - stamp(): `HH:MM:SS` rendering used as the log prefix
pub trait Clock: Send + Sync {
    fn time_of_day(&self) -> NaiveTime;

    /// Time of day formatted for log lines.
    fn stamp(&self) -> String {
        self.time_of_day().format("%H:%M:%S").to_string()
    }
}

/// Default clock backed by the host's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl LocalClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for LocalClock {
    #[inline]
    fn time_of_day(&self) -> NaiveTime {
        chrono::Local::now().time()
    }
}

/// Add a std duration to a time of day, wrapping at midnight.
#[inline]
pub fn add_wrapping(t: NaiveTime, d: std::time::Duration) -> NaiveTime {
    let delta = TimeDelta::from_std(d).unwrap_or(TimeDelta::zero());
    t.overflowing_add_signed(delta).0
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Deterministic clock whose time of day is set and advanced manually.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        time: Arc<Mutex<NaiveTime>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::at(12, 0, 0)
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self::default()
        }

        /// Clock frozen at the given time of day (invalid input falls back to midnight).
        pub fn at(h: u32, m: u32, s: u32) -> Self {
            let t = NaiveTime::from_hms_opt(h, m, s).unwrap_or_default();
            Self {
                time: Arc::new(Mutex::new(t)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut t) = self.time.lock() {
                *t = add_wrapping(*t, d);
            }
        }
    }

    impl Clock for TestClock {
        fn time_of_day(&self) -> NaiveTime {
            self.time.lock().map(|g| *g).unwrap_or_default()
        }
    }
}
