//! Boundcache - A thread-safe, weight-bounded in-memory cache
//!
//! Provides get/put/remove with LRU or FIFO eviction, pluggable entry weights
//! and lazy TTL expiration, plus a concurrent workload driver.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use cache::{BoundedCache, CacheBuilder, CacheStats, EvictionPolicy};
pub use config::Config;
pub use error::{CacheError, InvariantViolation, Result};
pub use tasks::spawn_workers;
