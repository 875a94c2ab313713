//! # Bounded Cache Core
//!
//! [`PolicyCache`] composes a hash index with an eviction policy under a
//! selectable locking regime. It is the L2 building block everything else in
//! the crate stacks on: the sharded cache partitions over it, the shared
//! variants wrap it in a process-global slot, and the method registry hands
//! out type-erased instances of it.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────┐
//!   │                 PolicyCache<K, V, P, S>                     │
//!   │                                                             │
//!   │   capacity: usize         (immutable after construction)    │
//!   │   ┌───────────────────────────────────────────────────────┐ │
//!   │   │        S::Cell<…>  (Shared / Exclusive / Unsync)      │ │
//!   │   │                                                       │ │
//!   │   │   index:  FxHashMap<K, V>     (owns the values)       │ │
//!   │   │   policy: P                   (owns key bookkeeping)  │ │
//!   │   └───────────────────────────────────────────────────────┘ │
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Index and policy mirror each other: every indexed key has exactly one
//! bookkeeping record and vice versa. The cache never trusts that blindly:
//! if the policy disowns a key the index just confirmed (or nominates a
//! victim the index does not hold), the core clears itself and carries on,
//! per the contract "a cache is a cache, never corrupt state".
//!
//! ## Locking
//!
//! | Operation  | Acquisition                                        |
//! |------------|----------------------------------------------------|
//! | `get`      | shared probe, then exclusive re-check + touch      |
//! | `put`      | exclusive                                          |
//! | `clear`    | exclusive                                          |
//! | `len`      | shared snapshot                                    |
//! | `contains` | shared                                             |
//!
//! The `get` upgrade is not atomic: the membership probe releases the shared
//! lock before the exclusive acquisition, and existence is re-checked under
//! the exclusive lock. Read locks cannot be upgraded in place, so the
//! re-check is what makes the race benign.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::cache::LruCache;
//!
//! let cache: LruCache<u64, String> = LruCache::try_new(2).unwrap();
//! cache.put(1, "one".to_string());
//! cache.put(2, "two".to_string());
//!
//! assert_eq!(cache.get(&1), Some("one".to_string()));
//!
//! // 2 is now the coldest key; inserting a third evicts it
//! cache.put(3, "three".to_string());
//! assert_eq!(cache.get(&2), None);
//! assert_eq!(cache.len(), 2);
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::ConfigError;
use crate::policy::{
    EvictionPolicy, FifoPolicy, HalvingLfuPolicy, LfuPolicy, LruPolicy, MruPolicy, RedisLfuPolicy,
    SlruPolicy, TwoQPolicy,
};
use crate::sync::{new_cell, Shared, SyncCell, SyncPolicy};
use crate::traits::Cache;

/// LRU-evicting cache core.
pub type LruCache<K, V, S = Shared> = PolicyCache<K, V, LruPolicy<K>, S>;
/// MRU-evicting cache core.
pub type MruCache<K, V, S = Shared> = PolicyCache<K, V, MruPolicy<K>, S>;
/// FIFO-evicting cache core.
pub type FifoCache<K, V, S = Shared> = PolicyCache<K, V, FifoPolicy<K>, S>;
/// 2Q-evicting cache core.
pub type TwoQCache<K, V, S = Shared> = PolicyCache<K, V, TwoQPolicy<K>, S>;
/// Segmented-LRU cache core.
pub type SlruCache<K, V, S = Shared> = PolicyCache<K, V, SlruPolicy<K>, S>;
/// Bucketed-LFU cache core.
pub type LfuCache<K, V, S = Shared> = PolicyCache<K, V, LfuPolicy<K>, S>;
/// Halving-LFU cache core.
pub type HalvingLfuCache<K, V, S = Shared> = PolicyCache<K, V, HalvingLfuPolicy<K>, S>;
/// Redis-style probabilistic LFU cache core.
pub type RedisLfuCache<K, V, S = Shared> = PolicyCache<K, V, RedisLfuPolicy<K>, S>;

struct CacheState<K, V, P> {
    index: FxHashMap<K, V>,
    policy: P,
}

impl<K, V, P> CacheState<K, V, P>
where
    K: Eq + Hash,
    P: EvictionPolicy<K>,
{
    /// Desync recovery: drop everything rather than serve from a corrupt
    /// pairing of index and bookkeeping.
    fn reset(&mut self) {
        self.index.clear();
        self.policy.on_clear();
    }
}

/// Bounded `K → V` mapping driven by an eviction policy `P` under the
/// locking regime `S`.
pub struct PolicyCache<K, V, P, S: SyncPolicy = Shared> {
    state: S::Cell<CacheState<K, V, P>>,
    capacity: usize,
}

impl<K, V, P, S> PolicyCache<K, V, P, S>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K>,
    S: SyncPolicy,
{
    /// Creates a cache with a default-constructed policy.
    ///
    /// Rejects `capacity == 0`; the index and the policy are pre-sized for
    /// `capacity` entries.
    ///
    /// # Example
    ///
    /// ```
    /// use memokit::cache::LruCache;
    ///
    /// let cache: LruCache<u64, u64> = LruCache::try_new(64).unwrap();
    /// assert_eq!(cache.capacity(), 64);
    /// assert!(LruCache::<u64, u64>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError>
    where
        P: Default,
    {
        Self::try_with_policy(capacity, P::default())
    }

    /// Creates a cache around an existing policy instance.
    ///
    /// Used by the builder to install boxed policies; the policy must be
    /// empty.
    pub fn try_with_policy(capacity: usize, mut policy: P) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be at least 1"));
        }
        policy.reserve(capacity)?;
        Ok(Self {
            state: new_cell::<S, _>(CacheState {
                index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
                policy,
            }),
            capacity,
        })
    }

    /// Looks up `key`, counting a hit as an access under the policy.
    ///
    /// Two-phase: a shared-lock membership probe returns misses without ever
    /// taking the exclusive lock; hits upgrade (with a re-check) to touch the
    /// policy and copy the value out.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let present = self.state.read(|state| state.index.contains_key(key));
        if !present {
            return None;
        }
        self.state.write(|state| {
            // The probe ran under a different acquisition; re-check.
            if !state.index.contains_key(key) {
                return None;
            }
            if !state.policy.on_access(key) {
                warn!("eviction policy lost track of an indexed key; clearing cache");
                state.reset();
                return None;
            }
            state.index.get(key).cloned()
        })
    }

    /// Inserts or overwrites `key`.
    ///
    /// An overwrite counts as an access and never evicts. A fresh insert
    /// into a full cache first removes the policy's chosen victim, so the
    /// index never exceeds capacity.
    pub fn put(&self, key: K, value: V) {
        self.state.write(|state| {
            if let Some(slot) = state.index.get_mut(&key) {
                *slot = value;
                if !state.policy.on_access(&key) {
                    warn!("eviction policy lost track of an indexed key; clearing cache");
                    state.reset();
                }
                return;
            }

            if state.index.len() >= self.capacity {
                if let Some(victim) = state.policy.select_for_eviction() {
                    if state.index.remove(&victim).is_some() {
                        state.policy.on_remove(&victim);
                    } else {
                        warn!("eviction victim missing from index; clearing cache");
                        state.reset();
                    }
                }
            }

            if state.index.len() < self.capacity {
                state.index.insert(key.clone(), value);
                state.policy.on_insert(key);
            }
        });
    }

    /// Drops every entry and all policy bookkeeping. Never fails.
    pub fn clear(&self) {
        self.state.write(CacheState::reset);
    }

    /// Number of entries, snapshotted under a shared lock.
    pub fn len(&self) -> usize {
        self.state.read(|state| state.index.len())
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Membership probe that does not count as an access.
    pub fn contains(&self, key: &K) -> bool {
        self.state.read(|state| state.index.contains_key(key))
    }

    /// `false` exactly when the no-op locking regime is selected.
    pub fn is_mt_safe(&self) -> bool {
        S::MT_SAFE
    }
}

impl<K, V, P, S> Cache<K, V> for PolicyCache<K, V, P, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: EvictionPolicy<K>,
    S: SyncPolicy,
{
    fn get(&self, key: &K) -> Option<V> {
        PolicyCache::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        PolicyCache::put(self, key, value)
    }

    fn clear(&self) {
        PolicyCache::clear(self)
    }

    fn len(&self) -> usize {
        PolicyCache::len(self)
    }

    fn capacity(&self) -> usize {
        PolicyCache::capacity(self)
    }

    fn contains(&self, key: &K) -> bool {
        PolicyCache::contains(self, key)
    }

    fn is_mt_safe(&self) -> bool {
        PolicyCache::is_mt_safe(self)
    }
}

impl<K, V, P, S> fmt::Debug for PolicyCache<K, V, P, S>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K>,
    S: SyncPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
