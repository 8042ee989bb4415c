//! Shared fixtures for integration tests.

pub mod desk;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use std::env;
use std::ffi::OsString;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Monday 2026-03-02 09:00 UTC, the instant every scenario starts at.
#[must_use]
pub fn reference_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Clock shared by a scenario; only moves when the test moves it.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    /// Creates a clock stopped at `now`.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        *self.lock() += delta;
    }

    fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Sets environment variables until dropped, serializing every test that
/// touches the process environment.
pub struct ScopedEnv {
    restore: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    /// Applies `vars`; a `None` value removes the variable.
    #[must_use]
    pub fn apply(vars: &[(&str, Option<&str>)]) -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let restore = vars
            .iter()
            .map(|(name, value)| {
                let previous = env::var_os(name);
                // SAFETY: ENV_MUTEX serializes environment mutation in tests.
                unsafe {
                    match value {
                        Some(new_value) => env::set_var(name, new_value),
                        None => env::remove_var(name),
                    }
                }
                (OsString::from(name), previous)
            })
            .collect();
        Self {
            restore,
            _lock: lock,
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (name, previous) in self.restore.drain(..).rev() {
            // SAFETY: the guard still holds ENV_MUTEX.
            unsafe {
                match previous {
                    Some(value) => env::set_var(&name, value),
                    None => env::remove_var(&name),
                }
            }
        }
    }
}
