//! Unified cache builder over all eviction policies.
//!
//! Picks the policy at runtime through a [`PolicyKind`] value instead of a
//! type parameter, trading a vtable dispatch per bookkeeping call for one
//! construction surface.
//!
//! ## Example
//!
//! ```
//! use memokit::builder::{CacheBuilder, PolicyKind};
//!
//! let cache = CacheBuilder::new(100)
//!     .policy(PolicyKind::Slru)
//!     .try_build::<u64, String>()
//!     .unwrap();
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::cache::PolicyCache;
use crate::error::ConfigError;
use crate::policy::{
    EvictionPolicy, FifoPolicy, HalvingLfuPolicy, LfuPolicy, LruPolicy, MruPolicy, RedisLfuPolicy,
    SlruPolicy, TwoQPolicy,
};
use crate::sync::{Shared, Unsync};

/// Boxed policy used by builder-produced caches.
pub type BoxedPolicy<K> = Box<dyn EvictionPolicy<K> + Send + Sync>;

/// Cache type produced by [`CacheBuilder::try_build`].
pub type BuiltCache<K, V> = PolicyCache<K, V, BoxedPolicy<K>, Shared>;

/// Cache type produced by [`CacheBuilder::try_build_unsync`].
pub type BuiltUnsyncCache<K, V> = PolicyCache<K, V, BoxedPolicy<K>, Unsync>;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used eviction.
    Lru,
    /// Most Recently Used eviction.
    Mru,
    /// First In, First Out eviction.
    Fifo,
    /// 2Q: newcomer queue drained before the proven queue.
    TwoQ,
    /// Segmented LRU with a protected segment.
    Slru,
    /// Least Frequently Used eviction (bucketed, exact counts).
    Lfu,
    /// LFU with periodic frequency halving.
    HalvingLfu,
    /// Redis-style probabilistic LFU with time decay.
    RedisLfu,
}

/// Constructs an empty boxed policy of the given kind.
pub fn boxed_policy<K>(kind: PolicyKind) -> BoxedPolicy<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    match kind {
        PolicyKind::Lru => Box::new(LruPolicy::new()),
        PolicyKind::Mru => Box::new(MruPolicy::new()),
        PolicyKind::Fifo => Box::new(FifoPolicy::new()),
        PolicyKind::TwoQ => Box::new(TwoQPolicy::new()),
        PolicyKind::Slru => Box::new(SlruPolicy::new()),
        PolicyKind::Lfu => Box::new(LfuPolicy::new()),
        PolicyKind::HalvingLfu => Box::new(HalvingLfuPolicy::new()),
        PolicyKind::RedisLfu => Box::new(RedisLfuPolicy::new()),
    }
}

/// Builder for caches with a runtime-selected policy.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    capacity: usize,
    policy: PolicyKind,
}

impl CacheBuilder {
    /// Starts a builder for a cache of `capacity` entries. LRU by default.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            policy: PolicyKind::Lru,
        }
    }

    /// Selects the eviction policy.
    pub fn policy(mut self, kind: PolicyKind) -> Self {
        self.policy = kind;
        self
    }

    /// Builds a thread-safe cache.
    pub fn try_build<K, V>(self) -> Result<BuiltCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
    {
        PolicyCache::try_with_policy(self.capacity, boxed_policy(self.policy))
    }

    /// Builds a single-threaded cache (no-op locking).
    pub fn try_build_unsync<K, V>(self) -> Result<BuiltUnsyncCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
    {
        PolicyCache::try_with_policy(self.capacity, boxed_policy(self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [PolicyKind; 8] = [
        PolicyKind::Lru,
        PolicyKind::Mru,
        PolicyKind::Fifo,
        PolicyKind::TwoQ,
        PolicyKind::Slru,
        PolicyKind::Lfu,
        PolicyKind::HalvingLfu,
        PolicyKind::RedisLfu,
    ];

    #[test]
    fn all_policies_basic_ops() {
        for kind in ALL_KINDS {
            let cache = CacheBuilder::new(10)
                .policy(kind)
                .try_build::<u64, String>()
                .unwrap();

            cache.put(1, "one".to_string());
            cache.put(2, "two".to_string());

            assert_eq!(cache.get(&1), Some("one".to_string()), "{kind:?}");
            assert_eq!(cache.get(&3), None, "{kind:?}");
            assert!(cache.contains(&1), "{kind:?}");
            assert_eq!(cache.len(), 2, "{kind:?}");

            cache.put(1, "ONE".to_string());
            assert_eq!(cache.get(&1), Some("ONE".to_string()), "{kind:?}");
            assert_eq!(cache.len(), 2, "{kind:?}");

            cache.clear();
            assert!(cache.is_empty(), "{kind:?}");
        }
    }

    #[test]
    fn all_policies_enforce_capacity() {
        for kind in ALL_KINDS {
            let cache = CacheBuilder::new(3)
                .policy(kind)
                .try_build::<u64, u64>()
                .unwrap();
            for i in 0..50 {
                cache.put(i, i);
                assert!(cache.len() <= 3, "{kind:?}");
            }
            assert_eq!(cache.len(), 3, "{kind:?}");
        }
    }

    #[test]
    fn zero_capacity_fails_for_every_policy() {
        for kind in ALL_KINDS {
            assert!(
                CacheBuilder::new(0).policy(kind).try_build::<u64, u64>().is_err(),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn unsync_build_reports_not_mt_safe() {
        let cache = CacheBuilder::new(4)
            .try_build_unsync::<u64, u64>()
            .unwrap();
        assert!(!cache.is_mt_safe());
        cache.put(1, 10);
        assert_eq!(cache.get(&1), Some(10));
    }
}
