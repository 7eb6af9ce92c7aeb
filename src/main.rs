//! Boundcache driver - runs a concurrent workload against one shared cache
//!
//! Reports operation counts, cache statistics and the post-run invariant check
//! as JSON on stdout.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boundcache::models::{StressReport, WorkerReport};
use boundcache::tasks::{spawn_workers, WorkloadCache};
use boundcache::Config;

/// Main entry point for the workload driver.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache from the configuration
/// 4. Spawn worker threads and wait for all of them
/// 5. Check cache invariants and print the report
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boundcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting boundcache workload driver");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: capacity={}, policy={}, ttl_ms={:?}, workers={}, ops_per_thread={}, key_space={}",
        config.capacity,
        config.eviction_policy,
        config.ttl_ms,
        config.worker_threads,
        config.ops_per_thread,
        config.key_space
    );

    let cache = Arc::new(WorkloadCache::from_config(&config).context("failed to build cache")?);

    let started = Instant::now();
    let handles = spawn_workers(Arc::clone(&cache), &config).context("failed to spawn workers")?;
    let workers = handles
        .into_iter()
        .enumerate()
        .map(|(index, handle)| {
            handle
                .join()
                .map_err(|_| anyhow!("worker {index} panicked"))
        })
        .collect::<anyhow::Result<Vec<WorkerReport>>>()?;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!("All workers finished in {} ms", elapsed_ms);

    let invariant_violation = match cache.check_invariants() {
        Ok(()) => None,
        Err(violation) => {
            warn!("{}", violation);
            Some(violation.to_string())
        }
    };

    let report = StressReport::new(config, elapsed_ms, workers, cache.stats(), invariant_violation);
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("failed to serialize report")?
    );

    if !report.passed() {
        bail!("cache invariants violated after workload");
    }
    info!("Workload complete, invariants hold");
    Ok(())
}
