//! Manually advanced clock for cooldown and expiry tests.

use chrono::{DateTime, TimeZone, Utc};
use courtside_core::Clock;
use parking_lot::Mutex;

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Start at an arbitrary fixed instant.
    pub fn new() -> Self {
        Self::at_unix(1_760_000_000)
    }

    /// Start at a unix timestamp (seconds).
    pub fn at_unix(secs: i64) -> Self {
        Self {
            now: Mutex::new(Utc.timestamp_opt(secs, 0).single().unwrap_or_default()),
        }
    }

    /// Advance by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock();
        *now = *now + chrono::Duration::seconds(secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
