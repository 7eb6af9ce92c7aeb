//! Concurrent Workload Task
//!
//! Spawns OS threads that hammer one shared cache with random puts, gets,
//! removes and presence checks.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rand::Rng;
use tracing::{debug, info};

use crate::cache::BoundedCache;
use crate::config::Config;
use crate::error::CacheError;
use crate::models::WorkerReport;

/// Cache shape used by the workload: numeric keys and values.
pub type WorkloadCache = BoundedCache<u64, u64>;

/// Spawns `config.worker_threads` workers against `cache`.
///
/// Each worker performs `config.ops_per_thread` operations over
/// `config.key_space` keys and returns its own operation counts when joined.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(WorkloadCache::from_config(&config)?);
/// let handles = spawn_workers(cache.clone(), &config)?;
/// let reports: Vec<WorkerReport> = handles.into_iter().map(|h| h.join().unwrap()).collect();
/// ```
pub fn spawn_workers(
    cache: Arc<WorkloadCache>,
    config: &Config,
) -> io::Result<Vec<JoinHandle<WorkerReport>>> {
    info!(
        "Starting {} workers with {} ops each over {} keys",
        config.worker_threads, config.ops_per_thread, config.key_space
    );

    (0..config.worker_threads)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            let ops = config.ops_per_thread;
            let key_space = config.key_space;
            thread::Builder::new()
                .name(format!("cache-worker-{worker}"))
                .spawn(move || run_worker(worker, &cache, ops, key_space))
        })
        .collect()
}

/// Runs one worker's operation mix on the calling thread.
///
/// Mix: 40% put, 40% get, 10% remove, 10% contains_key.
pub fn run_worker(worker: usize, cache: &WorkloadCache, ops: usize, key_space: u64) -> WorkerReport {
    let mut rng = rand::thread_rng();
    let mut report = WorkerReport::new(worker);

    for _ in 0..ops {
        let key = rng.gen_range(0..key_space);
        match rng.gen_range(0..10u8) {
            0..=3 => {
                report.puts += 1;
                if let Err(CacheError::EntryTooLarge { .. }) = cache.put(key, rng.gen()) {
                    report.rejected += 1;
                }
            }
            4..=7 => {
                report.gets += 1;
                if cache.get(&key).is_some() {
                    report.hits += 1;
                }
            }
            8 => {
                report.removes += 1;
                cache.remove(&key);
            }
            _ => {
                report.contains += 1;
                cache.contains_key(&key);
            }
        }
    }

    debug!(worker, operations = report.operations(), "worker finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> Config {
        Config {
            capacity: 10,
            worker_threads: 4,
            ops_per_thread: 2_000,
            key_space: 32,
            ..Config::default()
        }
    }

    #[test]
    fn test_run_worker_counts_every_operation() {
        let cache = WorkloadCache::new(10).unwrap();

        let report = run_worker(3, &cache, 500, 16);

        assert_eq!(report.worker, 3);
        assert_eq!(report.operations(), 500);
        assert!(report.hits <= report.gets);
        assert_eq!(report.rejected, 0);
        assert!(cache.len() <= 10);
    }

    #[test]
    fn test_spawn_workers_respects_capacity() {
        let config = small_config();
        let cache = Arc::new(WorkloadCache::from_config(&config).unwrap());

        let handles = spawn_workers(Arc::clone(&cache), &config).unwrap();
        let reports: Vec<WorkerReport> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(reports.len(), 4);
        for report in &reports {
            assert_eq!(report.operations(), 2_000);
        }
        assert!(cache.total_weight() <= 10);
        cache.check_invariants().unwrap();
    }
}
