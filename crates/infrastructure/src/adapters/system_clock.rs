//! Wall-clock time source for credential expirations.

use chrono::{DateTime, Utc};
use sessionkit_application::ports::Clock;

/// [`Clock`] backed by the system time.
///
/// Expirations are stored as epoch milliseconds, so `now_millis` reads the
/// system time once instead of going through `now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
