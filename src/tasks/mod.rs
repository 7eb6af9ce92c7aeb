//! Background Tasks Module
//!
//! Worker threads that drive a shared cache with a random operation mix.

mod workload;

pub use workload::{run_worker, spawn_workers, WorkloadCache};
