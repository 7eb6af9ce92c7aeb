//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction and mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A single entry weighs more than the whole cache can hold
    #[error("Entry too large: weight {weight} exceeds capacity {capacity}")]
    EntryTooLarge {
        /// Weight reported by the weigher
        weight: u64,
        /// Configured total capacity
        capacity: u64,
    },

    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

// == Invariant Violation ==
/// Returned by `BoundedCache::check_invariants` when internal bookkeeping is inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invariant violated: {0}")]
pub struct InvariantViolation(pub String);

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
