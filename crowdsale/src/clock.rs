//! Time sources
//!
//! The sale never keeps its own notion of time; it reads the current
//! timestamp (seconds) from a `Clock` on every call.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait Clock: Send + Sync {
    /// Current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Wall clock (UTC)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }
}

/// Externally driven clock for tests and simulations. Clones share the
/// same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the clock forward. Never moves backwards.
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Jump to `timestamp` if it is later than the current time
    pub fn set(&self, timestamp: u64) {
        self.now.fetch_max(timestamp, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Common durations in seconds
pub mod duration {
    pub const MINUTE: u64 = 60;
    pub const HOUR: u64 = 60 * MINUTE;
    pub const DAY: u64 = 24 * HOUR;
    pub const YEAR: u64 = 365 * DAY;

    pub const fn minutes(n: u64) -> u64 {
        n * MINUTE
    }

    pub const fn years(n: u64) -> u64 {
        n * YEAR
    }
}
