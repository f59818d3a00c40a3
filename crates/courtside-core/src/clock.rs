//! Clock seam.
//!
//! Engines never call `Utc::now()` directly; they hold an injected
//! `Arc<dyn Clock>` so tests can advance time without sleeping. Cooldown
//! and expiry arithmetic all flows through this one seam.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current unix time in whole seconds.
    fn now_unix(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
