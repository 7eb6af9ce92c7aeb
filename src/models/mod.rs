//! Report models for the workload driver
//!
//! Serializable summaries of a concurrent run against the cache.

pub mod report;

// Re-export commonly used types
pub use report::{StressReport, WorkerReport};
