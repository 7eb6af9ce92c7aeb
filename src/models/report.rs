//! Workload report DTOs
//!
//! Defines what the driver prints once every worker has finished.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::config::Config;

/// Operation counts for one worker thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    /// Worker index, or the number of workers for an aggregate
    pub worker: usize,
    pub puts: u64,
    pub gets: u64,
    /// Gets that returned a value
    pub hits: u64,
    pub removes: u64,
    pub contains: u64,
    /// Puts refused with `EntryTooLarge`
    pub rejected: u64,
}

impl WorkerReport {
    /// Creates an empty report for `worker`
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Self::default()
        }
    }

    /// Total operations performed.
    pub fn operations(&self) -> u64 {
        self.puts + self.gets + self.removes + self.contains
    }

    /// Sums a set of per-worker reports.
    pub fn aggregate(reports: &[WorkerReport]) -> Self {
        reports
            .iter()
            .fold(Self::new(reports.len()), |mut total, report| {
                total.puts += report.puts;
                total.gets += report.gets;
                total.hits += report.hits;
                total.removes += report.removes;
                total.contains += report.contains;
                total.rejected += report.rejected;
                total
            })
    }
}

/// Full summary of a driver run.
#[derive(Debug, Clone, Serialize)]
pub struct StressReport {
    /// Completion time in RFC 3339 format
    pub timestamp: String,
    /// Settings the run used
    pub config: Config,
    /// Wall time from first spawn to last join
    pub elapsed_ms: u64,
    /// Sum over all workers
    pub totals: WorkerReport,
    pub workers: Vec<WorkerReport>,
    /// Cache counters after the run
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Result of the post-run invariant check, None when it passed
    pub invariant_violation: Option<String>,
}

impl StressReport {
    /// Creates a new StressReport stamped with the current time
    pub fn new(
        config: Config,
        elapsed_ms: u64,
        workers: Vec<WorkerReport>,
        stats: CacheStats,
        invariant_violation: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            config,
            elapsed_ms,
            totals: WorkerReport::aggregate(&workers),
            workers,
            hit_rate: stats.hit_rate(),
            stats,
            invariant_violation,
        }
    }

    /// Whether the cache passed its post-run invariant check.
    pub fn passed(&self) -> bool {
        self.invariant_violation.is_none()
    }
}
