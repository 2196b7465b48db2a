//! Clock abstraction for the replay simulator
//!
//! The simulator is the only component that touches time, and it does so
//! through the [`Clock`] trait so the full pipeline can run in tests without
//! wall-clock waits. Two implementations are provided:
//!
//! - [`SystemClock`]: real wall-clock time, sleeps with `std::thread::sleep`
//! - [`ManualClock`]: virtual time that advances instantly on sleep

use std::cell::Cell;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Source of time and pacing for the simulator
pub trait Clock {
    /// Current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Block for `ms` milliseconds (or advance virtual time by that much)
    fn sleep_ms(&self, ms: u64);

    /// Whether this clock tracks wall-clock time (vs virtual time)
    fn is_wall_clock(&self) -> bool;
}

/// Wall-clock time via the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Virtual clock for deterministic tests
///
/// `sleep_ms` advances the reported time without blocking, so a full replay
/// of thousands of ticks finishes instantly while still exercising the
/// simulator's pacing path.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<Timestamp>,
}

impl ManualClock {
    /// Create a manual clock starting at `start_ms`
    pub fn new(start_ms: Timestamp) -> Self {
        Self {
            now_ms: Cell::new(start_ms),
        }
    }

    /// Advance virtual time without sleeping
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now_ms.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}
