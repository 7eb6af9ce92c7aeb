//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with an O(1) eviction order,
//! weight accounting and lazy TTL expiration.
//!
//! All structural state (the map, the order list, the running weight and the
//! counters) sits behind a single `parking_lot::Mutex`. Every public operation
//! takes `&self`, so the cache is shared across threads with an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::order::{NodeId, OrderList};
use crate::cache::weigher::effective_weight;
use crate::cache::{
    CacheEntry, CacheStats, Clock, EvictionPolicy, FnWeigher, SystemClock, UnitWeigher, Weigher,
};
use crate::config::Config;
use crate::error::{CacheError, InvariantViolation, Result};

struct Slot<V> {
    entry: CacheEntry<V>,
    node: NodeId,
}

// == Cache State ==
/// Everything guarded by the cache lock.
struct CacheState<K, V> {
    entries: HashMap<K, Slot<V>>,
    order: OrderList<K>,
    total_weight: u64,
    stats: CacheStats,
}

impl<K, V> CacheState<K, V>
where
    K: Eq + Hash + Clone,
{
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: OrderList::new(),
            total_weight: 0,
            stats: CacheStats::new(),
        }
    }

    fn insert_new(&mut self, key: K, value: V, weight: u64, now: Instant) {
        let node = self.order.push_back(key.clone());
        let entry = CacheEntry::new(value, weight, now);
        self.entries.insert(key, Slot { entry, node });
        self.total_weight += weight;
        self.stats.record_insertion();
    }

    /// Replaces the value of a stored key, handing the value back if the key is absent.
    fn overwrite(
        &mut self,
        key: &K,
        value: V,
        weight: u64,
        now: Instant,
        promote: bool,
    ) -> std::result::Result<V, V> {
        let Some(slot) = self.entries.get_mut(key) else {
            return Err(value);
        };
        let old_weight = slot.entry.weight;
        let old = slot.entry.replace(value, weight, now);
        let node = slot.node;

        self.total_weight = self.total_weight - old_weight + weight;
        if promote {
            self.order.move_to_back(node);
        }
        self.stats.record_update();
        Ok(old)
    }

    /// Unlinks a key from both structures and releases its weight.
    fn detach(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let slot = self.entries.remove(key)?;
        self.order.remove(slot.node);
        self.total_weight -= slot.entry.weight;
        Some(slot.entry)
    }

    fn expire(&mut self, key: &K) {
        if self.detach(key).is_some() {
            self.stats.record_expiration();
            debug!("expired entry purged on access");
        }
    }

    /// Evicts from the head until an entry of `incoming` weight fits.
    ///
    /// Runs before the write so the running weight never goes past `capacity`.
    /// `protected` is the existing node of the key being written: it is never
    /// chosen and its weight is left out, since the write replaces it. It can
    /// only sit at the head under FIFO, so skipping it costs at most one step.
    fn make_room(&mut self, capacity: u64, incoming: u64, protected: Option<NodeId>) -> usize {
        let retained = protected
            .and_then(|id| self.order.key(id))
            .and_then(|key| self.entries.get(key))
            .map_or(0, |slot| slot.entry.weight);
        let budget = capacity.saturating_sub(incoming);
        let mut evicted = 0;
        let mut freed = 0u64;

        while self.total_weight - retained > budget {
            let removed = match (self.order.front_id(), protected) {
                (Some(head), Some(id)) if head == id => self
                    .order
                    .next_id(head)
                    .and_then(|next| self.order.remove(next)),
                _ => self.order.pop_front(),
            };
            // An empty order list or a key missing from the map means the
            // bijection is broken; stop rather than spin.
            let Some(key) = removed else {
                break;
            };
            let Some(slot) = self.entries.remove(&key) else {
                break;
            };
            self.total_weight -= slot.entry.weight;
            freed = freed.saturating_add(slot.entry.weight);
            evicted += 1;
            self.stats.record_eviction();
        }

        if evicted > 0 {
            debug!(
                evicted,
                freed_weight = freed,
                total_weight = self.total_weight,
                "evicted entries to make room"
            );
        }
        evicted
    }
}

// == Bounded Cache ==
/// A weight-bounded key/value cache with LRU or FIFO eviction and optional TTL.
///
/// Values are handed out as clones; wrap large values in `Arc` to make that cheap.
pub struct BoundedCache<K, V> {
    state: Mutex<CacheState<K, V>>,
    capacity: u64,
    policy: EvictionPolicy,
    ttl: Option<Duration>,
    weigher: Box<dyn Weigher<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructors ==
    /// Creates an LRU cache of `capacity` unit-weight entries with no TTL.
    pub fn new(capacity: u64) -> Result<Self> {
        Self::builder(capacity).build()
    }

    /// Starts a builder for a cache bounded by `capacity` weight units.
    pub fn builder(capacity: u64) -> CacheBuilder<K, V> {
        CacheBuilder::new(capacity)
    }

    /// Creates a cache from the capacity, policy and TTL in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Self::builder(config.capacity).eviction_policy(config.eviction_policy);
        if let Some(ttl) = config.ttl() {
            builder = builder.ttl(ttl);
        }
        builder.build()
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is absent or expired; an expired entry is purged
    /// as a side effect. Under LRU a hit promotes the entry to most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let now = self.clock.now();

        let (expired, node) = match state.entries.get(key) {
            Some(slot) => (slot.entry.is_expired(self.ttl, now), slot.node),
            None => {
                state.stats.record_miss();
                return None;
            }
        };

        if expired {
            state.expire(key);
            state.stats.record_miss();
            return None;
        }

        if self.policy.promotes_on_read() {
            state.order.move_to_back(node);
        }
        state.stats.record_hit();
        state.entries.get(key).map(|slot| slot.entry.value.clone())
    }

    // == Put ==
    /// Inserts or replaces a value, returning the previous live value.
    ///
    /// Fails with `EntryTooLarge`, leaving the cache untouched, when the entry
    /// alone weighs more than the capacity. Otherwise evicts from the head of the
    /// order until the new entry fits, then writes it.
    pub fn put(&self, key: K, value: V) -> Result<Option<V>> {
        let weight = effective_weight(self.weigher.as_ref(), &key, &value);

        let mut guard = self.state.lock();
        let state = &mut *guard;

        if weight > self.capacity {
            state.stats.record_rejection();
            debug!(weight, capacity = self.capacity, "rejected entry larger than capacity");
            return Err(CacheError::EntryTooLarge {
                weight,
                capacity: self.capacity,
            });
        }

        let now = self.clock.now();
        let stale = state
            .entries
            .get(&key)
            .map_or(false, |slot| slot.entry.is_expired(self.ttl, now));
        if stale {
            state.expire(&key);
        }

        let existing = state.entries.get(&key).map(|slot| slot.node);
        state.make_room(self.capacity, weight, existing);

        let promote = self.policy.promotes_on_write();
        let previous = match state.overwrite(&key, value, weight, now, promote) {
            Ok(old) => Some(old),
            Err(value) => {
                state.insert_new(key, value, weight, now);
                None
            }
        };
        Ok(previous)
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if it was live.
    pub fn remove(&self, key: &K) -> Option<V> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let now = self.clock.now();

        let entry = state.detach(key)?;
        if entry.is_expired(self.ttl, now) {
            state.stats.record_expiration();
            None
        } else {
            state.stats.record_removal();
            Some(entry.value)
        }
    }

    // == Contains Key ==
    /// Presence check that never promotes; purges the entry if it has expired.
    pub fn contains_key(&self, key: &K) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let now = self.clock.now();

        let expired = match state.entries.get(key) {
            Some(slot) => slot.entry.is_expired(self.ttl, now),
            None => return false,
        };
        if expired {
            state.expire(key);
        }
        !expired
    }

    // == TTL Remaining ==
    /// Time left before `key` expires.
    ///
    /// None if the key is absent, already expired, or the cache has no TTL.
    /// Never promotes and never purges.
    pub fn ttl_remaining(&self, key: &K) -> Option<Duration> {
        let state = self.state.lock();
        let now = self.clock.now();
        state
            .entries
            .get(key)
            .filter(|slot| !slot.entry.is_expired(self.ttl, now))
            .and_then(|slot| slot.entry.ttl_remaining(self.ttl, now))
    }

    // == Length ==
    /// Returns the current number of stored entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Current sum of entry weights.
    pub fn total_weight(&self) -> u64 {
        self.state.lock().total_weight
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.set_occupancy(state.entries.len(), state.total_weight);
        stats.capacity = self.capacity;
        stats
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed. Without a TTL this is a no-op.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let now = self.clock.now();

        let expired: Vec<K> = state
            .entries
            .iter()
            .filter(|(_, slot)| slot.entry.is_expired(self.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.expire(key);
        }
        expired.len()
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
        state.total_weight = 0;
    }

    // == Keys ==
    /// Snapshot of keys in eviction order, next victim first.
    pub fn keys(&self) -> Vec<K> {
        self.state.lock().order.iter().cloned().collect()
    }

    // == Check Invariants ==
    /// Verifies weight accounting, the capacity bound and that the map and the
    /// order list hold exactly the same keys.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        let state = self.state.lock();

        if state.order.len() != state.entries.len() {
            return Err(InvariantViolation(format!(
                "order holds {} keys but map holds {}",
                state.order.len(),
                state.entries.len()
            )));
        }

        let mut seen = 0usize;
        let mut cursor = state.order.front_id();
        while let Some(id) = cursor {
            let key = state
                .order
                .key(id)
                .ok_or_else(|| InvariantViolation("dangling order node".to_string()))?;
            match state.entries.get(key) {
                Some(slot) if slot.node == id => {}
                Some(_) => {
                    return Err(InvariantViolation(
                        "map slot points at a different order node".to_string(),
                    ))
                }
                None => {
                    return Err(InvariantViolation(
                        "order holds a key missing from the map".to_string(),
                    ))
                }
            }
            seen += 1;
            cursor = state.order.next_id(id);
        }
        if seen != state.entries.len() {
            return Err(InvariantViolation(format!(
                "walked {seen} order nodes, expected {}",
                state.entries.len()
            )));
        }

        let summed: u128 = state
            .entries
            .values()
            .map(|slot| u128::from(slot.entry.weight))
            .sum();
        if summed != u128::from(state.total_weight) {
            return Err(InvariantViolation(format!(
                "tracked weight {} differs from summed weight {summed}",
                state.total_weight
            )));
        }
        if state.total_weight > self.capacity {
            return Err(InvariantViolation(format!(
                "total weight {} exceeds capacity {}",
                state.total_weight, self.capacity
            )));
        }
        Ok(())
    }
}

impl<K, V> fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedCache")
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .field("ttl", &self.ttl)
            .field("entries", &state.entries.len())
            .field("total_weight", &state.total_weight)
            .finish()
    }
}

// == Cache Builder ==
/// Configures and constructs a [`BoundedCache`].
pub struct CacheBuilder<K, V> {
    capacity: u64,
    policy: EvictionPolicy,
    ttl: Option<Duration>,
    weigher: Box<dyn Weigher<K, V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            policy: EvictionPolicy::default(),
            ttl: None,
            weigher: Box::new(UnitWeigher),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Entries older than `ttl` since their last write are treated as absent.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Weighs entries with a closure.
    pub fn weigher<F>(self, weigher: F) -> Self
    where
        F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
    {
        self.weigher_impl(FnWeigher(weigher))
    }

    /// Weighs entries with any [`Weigher`] implementation.
    pub fn weigher_impl<W>(mut self, weigher: W) -> Self
    where
        W: Weigher<K, V> + 'static,
    {
        self.weigher = Box::new(weigher);
        self
    }

    /// Replaces the time source used for TTL checks.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validates the configuration and builds the cache.
    pub fn build(self) -> Result<BoundedCache<K, V>> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be greater than 0".to_string(),
            ));
        }
        if self.ttl == Some(Duration::ZERO) {
            return Err(CacheError::InvalidConfiguration(
                "ttl must be greater than 0".to_string(),
            ));
        }

        info!(
            capacity = self.capacity,
            policy = %self.policy,
            ttl_ms = self.ttl.map(|t| t.as_millis() as u64),
            "cache initialized"
        );

        Ok(BoundedCache {
            state: Mutex::new(CacheState::new()),
            capacity: self.capacity,
            policy: self.policy,
            ttl: self.ttl,
            weigher: self.weigher,
            clock: self.clock,
        })
    }
}
