//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value was last written
    pub inserted_at: Instant,
    /// Cost of this entry against the cache capacity
    pub weight: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now`.
    pub fn new(value: V, weight: u64, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
            weight,
        }
    }

    // == Age ==
    /// Time since the entry was written, saturating at zero.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry is expired once its age is greater than or
    /// equal to the TTL. With no TTL configured, entries never expire.
    pub fn is_expired(&self, ttl: Option<Duration>, now: Instant) -> bool {
        match ttl {
            Some(ttl) => self.age(now) >= ttl,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining lifetime, `Some(ZERO)` once expired, None without a TTL.
    pub fn ttl_remaining(&self, ttl: Option<Duration>, now: Instant) -> Option<Duration> {
        ttl.map(|ttl| ttl.saturating_sub(self.age(now)))
    }

    // == Replace ==
    /// Swaps in a new value and weight, restarting the TTL. Returns the old value.
    pub fn replace(&mut self, value: V, weight: u64, now: Instant) -> V {
        self.weight = weight;
        self.inserted_at = now;
        std::mem::replace(&mut self.value, value)
    }
}
