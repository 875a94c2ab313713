//! # Sharded Cache
//!
//! [`ShardedCache`] partitions the key space across a fixed number of
//! independent [`PolicyCache`] cores to cut lock contention: traffic for
//! different shards never meets the same lock. The shard for a key is
//! `hash(key) % n_shards`, computed with the same hasher the cores use for
//! their index.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │            ShardedCache<K, V, P, S, S2>                      │
//!   │                                                              │
//!   │   S::Cell<Vec<Option<Arc<PolicyCache<K, V, P, S2>>>>>        │
//!   │   ┌──────────┬──────────┬──────────┬──────────┐              │
//!   │   │ slot 0   │ slot 1   │ slot 2   │ slot 3   │  lazy:       │
//!   │   │ Some(…)  │ None     │ Some(…)  │ None     │  created on  │
//!   │   └────┬─────┴──────────┴────┬─────┴──────────┘  first put   │
//!   │        ▼                     ▼                               │
//!   │   PolicyCache            PolicyCache    (own lock each,      │
//!   │   cap = ⌈cap/n⌉          cap = ⌈cap/n⌉   min 1)              │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The outer lock guards only the slot vector. A slot, once materialized, is
//! never replaced, so readers clone the slot's `Arc` under the outer lock and
//! delegate after releasing it; steady-state traffic pays one shared outer
//! acquisition plus the inner core's own lock.
//!
//! `len()` sums per-shard snapshots taken independently; it is not a global
//! linearization point across shards.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::policy::LruPolicy;
//! use memokit::sharded::ShardedCache;
//!
//! let cache: ShardedCache<u64, String, LruPolicy<u64>> =
//!     ShardedCache::try_new(4, 128).unwrap();
//!
//! cache.put(1, "one".to_string());
//! assert_eq!(cache.get(&1), Some("one".to_string()));
//! assert_eq!(cache.shard_count(), 4);
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use tracing::debug;

use crate::cache::PolicyCache;
use crate::ds::ShardSelector;
use crate::error::ConfigError;
use crate::policy::EvictionPolicy;
use crate::sync::{new_cell, Shared, SyncCell, SyncPolicy};
use crate::traits::Cache;

type Slot<K, V, P, S2> = Option<Arc<PolicyCache<K, V, P, S2>>>;

/// Fixed-count partition of independent cache cores.
///
/// `S` is the locking regime of the slot vector, `S2` the regime of each
/// inner core; the composition is thread-safe iff both are.
pub struct ShardedCache<K, V, P, S: SyncPolicy = Shared, S2: SyncPolicy = Shared> {
    slots: S::Cell<Vec<Slot<K, V, P, S2>>>,
    selector: ShardSelector,
    capacity: usize,
    shard_capacity: usize,
}

impl<K, V, P, S, S2> ShardedCache<K, V, P, S, S2>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K> + Default,
    S: SyncPolicy,
    S2: SyncPolicy,
{
    /// Creates a sharded cache with `shards` slots over a total `capacity`.
    ///
    /// Each shard gets `max(1, capacity / shards)` entries. Rejects zero
    /// shards and zero capacity. Slots materialize on first `put` to their
    /// partition.
    pub fn try_new(shards: usize, capacity: usize) -> Result<Self, ConfigError> {
        if shards == 0 {
            return Err(ConfigError::new("shard count must be at least 1"));
        }
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be at least 1"));
        }
        let mut slots = Vec::with_capacity(shards);
        slots.resize_with(shards, || None);
        Ok(Self {
            slots: new_cell::<S, _>(slots),
            selector: ShardSelector::new(shards),
            capacity,
            shard_capacity: (capacity / shards).max(1),
        })
    }

    /// Looks up `key` in its shard. A shard never written to is a miss.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let idx = self.selector.shard_for_key(key);
        // Slots are never replaced, so the outer lock can be dropped before
        // delegating to the core.
        let core = self.slots.read(|slots| slots[idx].clone());
        core.and_then(|core| core.get(key))
    }

    /// Inserts or overwrites `key` in its shard, materializing the shard on
    /// first use.
    pub fn put(&self, key: K, value: V) {
        let idx = self.selector.shard_for_key(&key);
        let core = self.slots.write(|slots| match &mut slots[idx] {
            Some(core) => Arc::clone(core),
            slot => {
                debug!(shard = idx, capacity = self.shard_capacity, "materializing shard");
                let core = Arc::new(
                    PolicyCache::try_new(self.shard_capacity)
                        .expect("per-shard capacity is at least 1"),
                );
                *slot = Some(Arc::clone(&core));
                core
            }
        });
        core.put(key, value);
    }

    /// Clears every materialized shard.
    pub fn clear(&self) {
        self.slots.write(|slots| {
            for slot in slots.iter().flatten() {
                slot.clear();
            }
        });
    }

    /// Sum of per-shard sizes at the moment each shard is observed.
    ///
    /// Shards are snapshotted independently; concurrent writers may be
    /// counted in one shard and not another.
    pub fn len(&self) -> usize {
        let cores: Vec<_> = self
            .slots
            .read(|slots| slots.iter().flatten().cloned().collect());
        cores.iter().map(|core| core.len()).sum()
    }

    /// Returns `true` when every materialized shard is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total configured capacity across all shards.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Capacity of each individual shard.
    pub fn shard_capacity(&self) -> usize {
        self.shard_capacity
    }

    /// Number of shard slots.
    pub fn shard_count(&self) -> usize {
        self.selector.shard_count()
    }

    /// Membership probe in the key's shard; does not count as an access.
    pub fn contains(&self, key: &K) -> bool {
        let idx = self.selector.shard_for_key(key);
        let core = self.slots.read(|slots| slots[idx].clone());
        core.map(|core| core.contains(key)).unwrap_or(false)
    }

    /// Thread-safe iff both the slot-vector and the inner-core lock regimes
    /// are.
    pub fn is_mt_safe(&self) -> bool {
        S::MT_SAFE && S2::MT_SAFE
    }
}

impl<K, V, P, S, S2> Cache<K, V> for ShardedCache<K, V, P, S, S2>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: EvictionPolicy<K> + Default,
    S: SyncPolicy,
    S2: SyncPolicy,
{
    fn get(&self, key: &K) -> Option<V> {
        ShardedCache::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        ShardedCache::put(self, key, value)
    }

    fn clear(&self) {
        ShardedCache::clear(self)
    }

    fn len(&self) -> usize {
        ShardedCache::len(self)
    }

    fn capacity(&self) -> usize {
        ShardedCache::capacity(self)
    }

    fn contains(&self, key: &K) -> bool {
        ShardedCache::contains(self, key)
    }

    fn is_mt_safe(&self) -> bool {
        ShardedCache::is_mt_safe(self)
    }
}

impl<K, V, P, S, S2> fmt::Debug for ShardedCache<K, V, P, S, S2>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K> + Default,
    S: SyncPolicy,
    S2: SyncPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &self.shard_count())
            .field("capacity", &self.capacity)
            .field("shard_capacity", &self.shard_capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::LruPolicy;
    use crate::sync::Unsync;

    type Lru4 = ShardedCache<u64, u64, LruPolicy<u64>>;

    #[test]
    fn zero_shards_or_capacity_rejected() {
        assert!(Lru4::try_new(0, 16).is_err());
        assert!(Lru4::try_new(4, 0).is_err());
    }

    #[test]
    fn shard_capacity_floors_at_one() {
        let cache = Lru4::try_new(8, 4).unwrap();
        assert_eq!(cache.shard_capacity(), 1);
        let cache = Lru4::try_new(4, 128).unwrap();
        assert_eq!(cache.shard_capacity(), 32);
    }

    #[test]
    fn get_on_unmaterialized_shard_is_miss() {
        let cache = Lru4::try_new(4, 16).unwrap();
        assert_eq!(cache.get(&1), None);
        assert!(!cache.contains(&1));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn put_then_get_round_trips() {
        let cache = Lru4::try_new(4, 16).unwrap();
        for i in 0..16 {
            cache.put(i, i * 10);
        }
        for i in 0..16 {
            assert_eq!(cache.get(&i), Some(i * 10), "key {i}");
        }
    }

    #[test]
    fn len_sums_shards() {
        let cache = Lru4::try_new(2, 8).unwrap();
        for i in 0..6 {
            cache.put(i, i);
        }
        assert_eq!(cache.len(), 6);
    }

    #[test]
    fn keys_in_different_shards_never_evict_each_other() {
        let cache = Lru4::try_new(4, 4).unwrap(); // one entry per shard
        let selector = ShardSelector::new(4);

        // Pick four keys that land in distinct shards
        let mut chosen: Vec<u64> = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for key in 0u64.. {
            if seen.insert(selector.shard_for_key(&key)) {
                chosen.push(key);
                if chosen.len() == 4 {
                    break;
                }
            }
        }

        for &key in &chosen {
            cache.put(key, key);
        }
        for &key in &chosen {
            assert_eq!(cache.get(&key), Some(key), "key {key} was evicted cross-shard");
        }
    }

    #[test]
    fn clear_touches_all_materialized_shards() {
        let cache = Lru4::try_new(4, 16).unwrap();
        for i in 0..12 {
            cache.put(i, i);
        }
        cache.clear();
        assert!(cache.is_empty());
        for i in 0..12 {
            assert_eq!(cache.get(&i), None);
        }
    }

    #[test]
    fn mt_safety_requires_both_locks() {
        let both: ShardedCache<u64, u64, LruPolicy<u64>, Shared, Shared> =
            ShardedCache::try_new(2, 8).unwrap();
        assert!(both.is_mt_safe());

        let outer_only: ShardedCache<u64, u64, LruPolicy<u64>, Shared, Unsync> =
            ShardedCache::try_new(2, 8).unwrap();
        assert!(!outer_only.is_mt_safe());

        let inner_only: ShardedCache<u64, u64, LruPolicy<u64>, Unsync, Shared> =
            ShardedCache::try_new(2, 8).unwrap();
        assert!(!inner_only.is_mt_safe());
    }
}
