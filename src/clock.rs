use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveTime, Utc};

/// Source of "now", injectable so status derivation and attempt timestamps
/// are testable without touching the system clock.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;

    /// Local wall-clock time of day. Schedule windows are compared against
    /// this value; the calendar date never participates.
    fn time_of_day(&self) -> NaiveTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Settable clock for tests. Time only moves when `set` is called.
#[derive(Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<NaiveTime>>,
}

impl ManualClock {
    pub fn at(time: NaiveTime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(time)),
        }
    }

    pub fn set(&self, time: NaiveTime) {
        *self.inner.lock().unwrap() = time;
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        // Attempt timestamps only need to be monotonic-ish in tests; the
        // date component is irrelevant to every consumer.
        Utc::now()
    }

    fn time_of_day(&self) -> NaiveTime {
        *self.inner.lock().unwrap()
    }
}
