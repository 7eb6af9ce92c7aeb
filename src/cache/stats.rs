//! Cache Statistics Module
//!
//! Tracks cache activity: hits, misses, writes, evictions and expirations.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache counters and occupancy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key absent or expired)
    pub misses: u64,
    /// New keys written
    pub insertions: u64,
    /// Existing keys overwritten
    pub updates: u64,
    /// Entries removed by the caller
    pub removals: u64,
    /// Entries removed to restore the capacity bound
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Writes refused because the entry alone exceeds capacity
    pub rejections: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Current sum of entry weights
    pub total_weight: u64,
    /// Configured weight bound
    pub capacity: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    // == Update Occupancy ==
    /// Updates the entry count and weight gauges.
    pub fn set_occupancy(&mut self, entries: usize, weight: u64) {
        self.total_entries = entries;
        self.total_weight = weight;
    }
}
