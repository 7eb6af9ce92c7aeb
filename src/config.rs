//! Configuration Module
//!
//! Handles loading cache and workload settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::cache::EvictionPolicy;
use crate::error::{CacheError, Result};

/// Cache and driver configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Maximum total weight the cache can hold
    pub capacity: u64,
    /// Which entry is evicted first when over capacity
    pub eviction_policy: EvictionPolicy,
    /// Entry lifetime in milliseconds since insertion, None = entries never expire
    pub ttl_ms: Option<u64>,
    /// Number of OS threads the driver spawns
    pub worker_threads: usize,
    /// Operations each driver thread performs
    pub ops_per_thread: usize,
    /// Number of distinct keys the driver draws from
    pub key_space: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum total weight (default: 1000)
    /// - `CACHE_EVICTION_POLICY` - `lru` or `fifo` (default: lru)
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds, unset or 0 disables expiry
    /// - `WORKER_THREADS` - Driver threads (default: 8)
    /// - `OPS_PER_THREAD` - Operations per driver thread (default: 10000)
    /// - `KEY_SPACE` - Distinct keys used by the driver (default: 64)
    ///
    /// Unlike unset variables, values that are present but unparseable are rejected.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let ttl_ms = parse_var(&lookup, "CACHE_TTL_MS", 0u64)?;

        let config = Self {
            capacity: parse_var(&lookup, "CACHE_CAPACITY", defaults.capacity)?,
            eviction_policy: parse_var(&lookup, "CACHE_EVICTION_POLICY", defaults.eviction_policy)?,
            ttl_ms: (ttl_ms > 0).then_some(ttl_ms),
            worker_threads: parse_var(&lookup, "WORKER_THREADS", defaults.worker_threads)?,
            ops_per_thread: parse_var(&lookup, "OPS_PER_THREAD", defaults.ops_per_thread)?,
            key_space: parse_var(&lookup, "KEY_SPACE", defaults.key_space)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no cache or workload can run with.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be greater than 0".to_string(),
            ));
        }
        if self.worker_threads == 0 {
            return Err(CacheError::InvalidConfiguration(
                "worker_threads must be greater than 0".to_string(),
            ));
        }
        if self.key_space == 0 {
            return Err(CacheError::InvalidConfiguration(
                "key_space must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Entry TTL as a Duration.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            eviction_policy: EvictionPolicy::Lru,
            ttl_ms: None,
            worker_threads: 8,
            ops_per_thread: 10_000,
            key_space: 64,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| {
            CacheError::InvalidConfiguration(format!("{name}={raw:?}: {e}"))
        }),
        None => Ok(default),
    }
}
