//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a straightforward reference model
//! and to verify its capacity and bookkeeping invariants.

use proptest::prelude::*;

use crate::cache::{BoundedCache, EvictionPolicy};
use crate::error::CacheError;

// == Test Configuration ==
const KEY_SPACE: u8 = 12;
const MAX_WEIGHT: u64 = 12;

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u8, value: u64 },
    Get { key: u8 },
    Remove { key: u8 },
    Contains { key: u8 },
}

fn key_strategy() -> impl Strategy<Value = u8> {
    0..KEY_SPACE
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (key_strategy(), 1..=MAX_WEIGHT).prop_map(|(key, value)| CacheOp::Put { key, value }),
        2 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => key_strategy().prop_map(|key| CacheOp::Contains { key }),
    ]
}

fn policy_strategy() -> impl Strategy<Value = EvictionPolicy> {
    prop_oneof![Just(EvictionPolicy::Lru), Just(EvictionPolicy::Fifo)]
}

/// Value doubles as weight so eviction depth varies from op to op.
fn weighted_cache(capacity: u64, policy: EvictionPolicy) -> BoundedCache<u8, u64> {
    BoundedCache::builder(capacity)
        .eviction_policy(policy)
        .weigher(|_k: &u8, v: &u64| *v)
        .build()
        .unwrap()
}

// == Reference Model ==
/// Ordered vector, head first. Linear scans everywhere, obviously correct.
struct Model {
    policy: EvictionPolicy,
    capacity: u64,
    items: Vec<(u8, u64)>,
}

impl Model {
    fn new(capacity: u64, policy: EvictionPolicy) -> Self {
        Self {
            policy,
            capacity,
            items: Vec::new(),
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.items.iter().position(|(k, _)| *k == key)
    }

    fn total(&self) -> u64 {
        self.items.iter().map(|(_, v)| *v).sum()
    }

    fn put(&mut self, key: u8, value: u64) -> Result<Option<u64>, ()> {
        if value > self.capacity {
            return Err(());
        }
        let previous = match self.position(key) {
            Some(pos) if self.policy == EvictionPolicy::Lru => {
                let (_, old) = self.items.remove(pos);
                self.items.push((key, value));
                Some(old)
            }
            Some(pos) => Some(std::mem::replace(&mut self.items[pos].1, value)),
            None => {
                self.items.push((key, value));
                None
            }
        };
        while self.total() > self.capacity {
            let victim = self.items.iter().position(|(k, _)| *k != key).unwrap();
            self.items.remove(victim);
        }
        Ok(previous)
    }

    fn get(&mut self, key: u8) -> Option<u64> {
        let pos = self.position(key)?;
        let item = self.items[pos];
        if self.policy == EvictionPolicy::Lru {
            self.items.remove(pos);
            self.items.push(item);
        }
        Some(item.1)
    }

    fn remove(&mut self, key: u8) -> Option<u64> {
        let pos = self.position(key)?;
        Some(self.items.remove(pos).1)
    }

    fn keys(&self) -> Vec<u8> {
        self.items.iter().map(|(k, _)| *k).collect()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Every operation returns what the model returns and leaves the same
    // eviction order behind.
    #[test]
    fn prop_matches_reference_model(
        capacity in 1u64..=20,
        policy in policy_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 1..120)
    ) {
        let cache = weighted_cache(capacity, policy);
        let mut model = Model::new(capacity, policy);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    let got = cache.put(key, value);
                    let expected = model
                        .put(key, value)
                        .map_err(|()| CacheError::EntryTooLarge { weight: value, capacity });
                    prop_assert_eq!(got, expected);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(key));
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key), model.remove(key));
                }
                CacheOp::Contains { key } => {
                    prop_assert_eq!(cache.contains_key(&key), model.position(key).is_some());
                }
            }
            prop_assert_eq!(cache.keys(), model.keys());
            prop_assert_eq!(cache.total_weight(), model.total());
        }
    }

    // Weight never exceeds capacity and map/order stay in bijection after
    // every completed operation.
    #[test]
    fn prop_capacity_and_bijection(
        capacity in 1u64..=20,
        policy in policy_strategy(),
        ops in prop::collection::vec(cache_op_strategy(), 1..200)
    ) {
        let cache = weighted_cache(capacity, policy);

        for op in ops {
            match op {
                CacheOp::Put { key, value } => { let _ = cache.put(key, value); }
                CacheOp::Get { key } => { let _ = cache.get(&key); }
                CacheOp::Remove { key } => { let _ = cache.remove(&key); }
                CacheOp::Contains { key } => { let _ = cache.contains_key(&key); }
            }
            prop_assert!(cache.total_weight() <= capacity);
            prop_assert_eq!(cache.keys().len(), cache.len());
            prop_assert!(cache.check_invariants().is_ok(), "{:?}", cache.check_invariants());
        }
    }

    // A second remove of the same key finds nothing and changes nothing.
    #[test]
    fn prop_remove_is_idempotent(
        policy in policy_strategy(),
        entries in prop::collection::vec((key_strategy(), 1..=3u64), 1..20),
        target in key_strategy()
    ) {
        let cache = weighted_cache(20, policy);
        for (key, value) in entries {
            cache.put(key, value).unwrap();
        }

        cache.remove(&target);
        let keys_after_first = cache.keys();
        let weight_after_first = cache.total_weight();

        prop_assert_eq!(cache.remove(&target), None);
        prop_assert_eq!(cache.keys(), keys_after_first);
        prop_assert_eq!(cache.total_weight(), weight_after_first);
    }

    // An entry heavier than the capacity is refused and nothing moves.
    #[test]
    fn prop_rejection_leaves_state_untouched(
        capacity in 1u64..=10,
        policy in policy_strategy(),
        entries in prop::collection::vec((key_strategy(), 1..=10u64), 0..20),
        key in key_strategy(),
        excess in 1u64..100
    ) {
        let cache = weighted_cache(capacity, policy);
        for (k, v) in entries {
            let _ = cache.put(k, v);
        }

        let keys_before = cache.keys();
        let contained: Vec<bool> = (0..KEY_SPACE).map(|k| cache.contains_key(&k)).collect();

        let result = cache.put(key, capacity + excess);

        prop_assert!(
            matches!(result, Err(CacheError::EntryTooLarge { .. })),
            "expected EntryTooLarge, got {:?}",
            result
        );
        prop_assert_eq!(cache.keys(), keys_before);
        let contained_after: Vec<bool> = (0..KEY_SPACE).map(|k| cache.contains_key(&k)).collect();
        prop_assert_eq!(contained_after, contained);
    }
}
