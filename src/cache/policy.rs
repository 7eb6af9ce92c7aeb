//! Eviction Policy Module
//!
//! Decides whether reads and overwrites reposition an entry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Eviction Policy ==
/// Selects which entry sits at the head of the eviction order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Evict the least recently accessed entry; `get` and overwrites promote
    #[default]
    Lru,
    /// Evict the oldest inserted entry; position is fixed at first insert
    Fifo,
}

impl EvictionPolicy {
    /// Whether a successful `get` moves the entry to the newest position.
    pub fn promotes_on_read(self) -> bool {
        matches!(self, EvictionPolicy::Lru)
    }

    /// Whether overwriting a live key moves it to the newest position.
    pub fn promotes_on_write(self) -> bool {
        matches!(self, EvictionPolicy::Lru)
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Lru => f.write_str("lru"),
            EvictionPolicy::Fifo => f.write_str("fifo"),
        }
    }
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionPolicy::Lru),
            "fifo" => Ok(EvictionPolicy::Fifo),
            other => Err(format!("unknown eviction policy '{other}', expected lru or fifo")),
        }
    }
}
