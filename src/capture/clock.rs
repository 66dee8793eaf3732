//! Injectable clock for the capture poll loop.
//!
//! The streaming capture loop runs against an explicit deadline.  Taking
//! the clock as a trait object keeps the loop deterministic under test —
//! a scripted handle advances a [`ManualClock`] instead of sleeping.

use std::time::Instant;

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ---------------------------------------------------------------------------
// ManualClock  (test-only)
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    now: std::sync::Mutex<Instant>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: std::sync::Mutex::new(Instant::now()),
        }
    }

    /// Advance the clock by `delta`.
    pub fn advance(&self, delta: std::time::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
