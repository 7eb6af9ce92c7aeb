//! Cache Module
//!
//! Provides a weight-bounded, thread-safe cache with LRU or FIFO eviction and
//! lazy TTL expiration.

mod clock;
mod entry;
mod order;
mod policy;
mod stats;
mod store;
mod weigher;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use order::{NodeId, OrderList};
pub use policy::EvictionPolicy;
pub use stats::CacheStats;
pub use store::{BoundedCache, CacheBuilder};
pub use weigher::{FnWeigher, UnitWeigher, Weigher};
