//! Injectable time source.
//!
//! The access policy is pure over the current time, so the clock is an
//! explicit dependency handed to the authenticator at construction instead
//! of an ambient global. Production code uses [`SystemClock`]; tests pin the
//! hour with [`FixedClock`].

use chrono::{DateTime, Local};
use std::sync::Mutex;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in the facility's local timezone.
    fn now(&self) -> DateTime<Local>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Settable clock for deterministic policy tests.
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    /// Create a clock pinned to the given instant.
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
