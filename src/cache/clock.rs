//! Clock Module
//!
//! Time source used for TTL checks, swappable for deterministic tests.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// == Clock Trait ==
/// Provides the current instant to the cache.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> Instant;
}

// == System Clock ==
/// Monotonic wall time via `Instant::now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Largest offset a `ManualClock` will reach: one century. Keeps
/// `origin + offset` representable as an `Instant` on every platform.
const MAX_OFFSET_NANOS: u64 = 100 * 365 * 24 * 60 * 60 * 1_000_000_000;

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Starts at the instant it was created and advances by explicit calls to
/// [`ManualClock::advance`]. Share it with the cache through an `Arc` and keep a
/// handle in the test to drive time.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward by `by`, saturating at one century past creation.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .offset_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(nanos).min(MAX_OFFSET_NANOS))
            });
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
