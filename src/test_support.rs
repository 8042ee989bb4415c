//! Shared fixtures for unit tests.

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex};

/// Clock that only moves when a test moves it.
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub(crate) fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }

    pub(crate) fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = instant;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// A fixed, readable reference instant.
pub(crate) fn reference_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .expect("valid reference instant")
}
