//! Weigher Module
//!
//! Assigns a weight to each entry. The cache keeps the sum of all weights at or
//! below its capacity, so with the default `UnitWeigher` capacity is simply the
//! maximum number of entries.

// == Weigher Trait ==
/// Computes the cost of an entry. Expected to be pure.
///
/// A weight of 0 is treated as 1 so that no entry escapes capacity accounting.
pub trait Weigher<K, V>: Send + Sync {
    fn weigh(&self, key: &K, value: &V) -> u64;
}

/// Every entry costs exactly 1 unit. This is the default weigher.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitWeigher;

impl<K, V> Weigher<K, V> for UnitWeigher {
    #[inline]
    fn weigh(&self, _key: &K, _value: &V) -> u64 {
        1
    }
}

/// A weigher backed by a closure.
pub struct FnWeigher<F>(pub F);

impl<K, V, F> Weigher<K, V> for FnWeigher<F>
where
    F: Fn(&K, &V) -> u64 + Send + Sync + 'static,
{
    #[inline]
    fn weigh(&self, key: &K, value: &V) -> u64 {
        (self.0)(key, value)
    }
}

/// Applies a weigher, clamping zero up to one.
pub(crate) fn effective_weight<K, V>(weigher: &dyn Weigher<K, V>, key: &K, value: &V) -> u64 {
    weigher.weigh(key, value).max(1)
}
