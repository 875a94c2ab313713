//! # Process-Global "Shared" Variants
//!
//! [`SharedCache`] and [`SharedShardedCache`] wrap a cache behind a slot
//! meant to live in a `static`. The slot starts empty; `initialize(...)`
//! creates the inner cache exactly once (the first sizing wins; later calls
//! are silent no-ops), and before initialization the cache simply does
//! nothing: `get` misses, `put` is a no-op, `len` and `capacity` report 0.
//!
//! The `const fn new` constructors make the `static` declaration the
//! singleton: one shared cache exists per declared item, and the type system
//! keys it by `(K, V, P)` the way a generic singleton would.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::policy::LruPolicy;
//! use memokit::shared::SharedCache;
//!
//! static NORM_CACHE: SharedCache<u64, f64, LruPolicy<u64>> = SharedCache::new();
//!
//! // Nothing happens until somebody initializes
//! NORM_CACHE.put(1, 0.5);
//! assert_eq!(NORM_CACHE.get(&1), None);
//!
//! NORM_CACHE.initialize(64).unwrap();
//! NORM_CACHE.initialize(9999).unwrap(); // no-op: the first sizing wins
//! assert_eq!(NORM_CACHE.capacity(), 64);
//!
//! NORM_CACHE.put(1, 0.5);
//! assert_eq!(NORM_CACHE.get(&1), Some(0.5));
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::cache::PolicyCache;
use crate::error::ConfigError;
use crate::policy::{EvictionPolicy, LruPolicy};
use crate::sharded::ShardedCache;
use crate::sync::Shared;
use crate::traits::Cache;

// ---------------------------------------------------------------------------
// SharedCache
// ---------------------------------------------------------------------------

/// Process-global plain cache with idempotent, lazily applied sizing.
///
/// The outer lock guards only the slot; once the inner cache exists it is
/// never replaced, and it synchronizes itself with its own lock.
pub struct SharedCache<K, V, P = LruPolicy<K>> {
    slot: RwLock<Option<PolicyCache<K, V, P, Shared>>>,
}

impl<K, V, P> SharedCache<K, V, P> {
    /// Creates an empty, uninitialized slot. Usable in `static` position.
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<K, V, P> SharedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K>,
{
    /// Creates the inner cache if it does not exist yet.
    ///
    /// Idempotent: once initialized, later calls (with any capacity) are
    /// no-ops and the original sizing stays.
    pub fn initialize(&self, capacity: usize) -> Result<(), ConfigError>
    where
        P: Default,
    {
        let mut slot = self.slot.write();
        if slot.is_none() {
            *slot = Some(PolicyCache::try_new(capacity)?);
        }
        Ok(())
    }

    /// Returns `true` once `initialize` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Looks up `key`; always a miss before initialization.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.slot.read().as_ref().and_then(|cache| cache.get(key))
    }

    /// Inserts or overwrites `key`; a no-op before initialization.
    pub fn put(&self, key: K, value: V) {
        if let Some(cache) = self.slot.read().as_ref() {
            cache.put(key, value);
        }
    }

    /// Clears the inner cache, if any.
    pub fn clear(&self) {
        if let Some(cache) = self.slot.read().as_ref() {
            cache.clear();
        }
    }

    /// Entry count; 0 before initialization.
    pub fn len(&self) -> usize {
        self.slot.read().as_ref().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity; 0 before initialization.
    pub fn capacity(&self) -> usize {
        self.slot
            .read()
            .as_ref()
            .map(|cache| cache.capacity())
            .unwrap_or(0)
    }

    /// Membership probe; `false` before initialization.
    pub fn contains(&self, key: &K) -> bool {
        self.slot
            .read()
            .as_ref()
            .map(|cache| cache.contains(key))
            .unwrap_or(false)
    }

    /// Reports the inner cache's thread safety; `false` before
    /// initialization.
    pub fn is_mt_safe(&self) -> bool {
        self.slot
            .read()
            .as_ref()
            .map(|cache| cache.is_mt_safe())
            .unwrap_or(false)
    }
}

impl<K, V, P> Default for SharedCache<K, V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P> Cache<K, V> for SharedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: EvictionPolicy<K>,
{
    fn get(&self, key: &K) -> Option<V> {
        SharedCache::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        SharedCache::put(self, key, value)
    }

    fn clear(&self) {
        SharedCache::clear(self)
    }

    fn len(&self) -> usize {
        SharedCache::len(self)
    }

    fn capacity(&self) -> usize {
        SharedCache::capacity(self)
    }

    fn contains(&self, key: &K) -> bool {
        SharedCache::contains(self, key)
    }

    fn is_mt_safe(&self) -> bool {
        SharedCache::is_mt_safe(self)
    }
}

impl<K, V, P> fmt::Debug for SharedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCache")
            .field("initialized", &self.is_initialized())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// SharedShardedCache
// ---------------------------------------------------------------------------

/// Process-global sharded cache with idempotent, lazily applied sizing.
pub struct SharedShardedCache<K, V, P = LruPolicy<K>> {
    slot: RwLock<Option<ShardedCache<K, V, P, Shared, Shared>>>,
}

impl<K, V, P> SharedShardedCache<K, V, P> {
    /// Creates an empty, uninitialized slot. Usable in `static` position.
    pub const fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<K, V, P> SharedShardedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K> + Default,
{
    /// Creates the inner sharded cache if it does not exist yet.
    ///
    /// Idempotent: the first `(shards, capacity)` to arrive wins.
    pub fn initialize(&self, shards: usize, capacity: usize) -> Result<(), ConfigError> {
        let mut slot = self.slot.write();
        if slot.is_none() {
            *slot = Some(ShardedCache::try_new(shards, capacity)?);
        }
        Ok(())
    }

    /// Returns `true` once `initialize` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Looks up `key`; always a miss before initialization.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.slot.read().as_ref().and_then(|cache| cache.get(key))
    }

    /// Inserts or overwrites `key`; a no-op before initialization.
    pub fn put(&self, key: K, value: V) {
        if let Some(cache) = self.slot.read().as_ref() {
            cache.put(key, value);
        }
    }

    /// Clears the inner cache, if any.
    pub fn clear(&self) {
        if let Some(cache) = self.slot.read().as_ref() {
            cache.clear();
        }
    }

    /// Entry count; 0 before initialization.
    pub fn len(&self) -> usize {
        self.slot.read().as_ref().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total configured capacity; 0 before initialization.
    pub fn capacity(&self) -> usize {
        self.slot
            .read()
            .as_ref()
            .map(|cache| cache.capacity())
            .unwrap_or(0)
    }

    /// Number of shard slots; 0 before initialization.
    pub fn shard_count(&self) -> usize {
        self.slot
            .read()
            .as_ref()
            .map(|cache| cache.shard_count())
            .unwrap_or(0)
    }

    /// Membership probe; `false` before initialization.
    pub fn contains(&self, key: &K) -> bool {
        self.slot
            .read()
            .as_ref()
            .map(|cache| cache.contains(key))
            .unwrap_or(false)
    }

    /// Reports the inner cache's thread safety; `false` before
    /// initialization.
    pub fn is_mt_safe(&self) -> bool {
        self.slot
            .read()
            .as_ref()
            .map(|cache| cache.is_mt_safe())
            .unwrap_or(false)
    }
}

impl<K, V, P> Default for SharedShardedCache<K, V, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P> Cache<K, V> for SharedShardedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    V: Clone,
    P: EvictionPolicy<K> + Default,
{
    fn get(&self, key: &K) -> Option<V> {
        SharedShardedCache::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        SharedShardedCache::put(self, key, value)
    }

    fn clear(&self) {
        SharedShardedCache::clear(self)
    }

    fn len(&self) -> usize {
        SharedShardedCache::len(self)
    }

    fn capacity(&self) -> usize {
        SharedShardedCache::capacity(self)
    }

    fn contains(&self, key: &K) -> bool {
        SharedShardedCache::contains(self, key)
    }

    fn is_mt_safe(&self) -> bool {
        SharedShardedCache::is_mt_safe(self)
    }
}

impl<K, V, P> fmt::Debug for SharedShardedCache<K, V, P>
where
    K: Eq + Hash + Clone,
    P: EvictionPolicy<K> + Default,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedShardedCache")
            .field("initialized", &self.is_initialized())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_cache_does_nothing() {
        let shared: SharedCache<u64, u64> = SharedCache::new();
        assert!(!shared.is_initialized());
        shared.put(1, 10);
        assert_eq!(shared.get(&1), None);
        assert_eq!(shared.len(), 0);
        assert_eq!(shared.capacity(), 0);
        assert!(!shared.is_mt_safe());
        shared.clear(); // harmless
    }

    #[test]
    fn initialize_is_idempotent_first_sizing_wins() {
        let shared: SharedCache<u64, u64> = SharedCache::new();
        shared.initialize(8).unwrap();
        shared.initialize(1000).unwrap();
        assert_eq!(shared.capacity(), 8);
        assert!(shared.is_mt_safe());
    }

    #[test]
    fn initialize_rejects_zero_capacity() {
        let shared: SharedCache<u64, u64> = SharedCache::new();
        assert!(shared.initialize(0).is_err());
        assert!(!shared.is_initialized());
        // And can still be initialized properly afterwards
        assert!(shared.initialize(4).is_ok());
    }

    #[test]
    fn works_after_initialization() {
        let shared: SharedCache<u64, String> = SharedCache::new();
        shared.initialize(2).unwrap();
        shared.put(1, "one".to_string());
        assert_eq!(shared.get(&1), Some("one".to_string()));
        shared.put(2, "two".to_string());
        shared.put(3, "three".to_string());
        assert_eq!(shared.len(), 2);
    }

    #[test]
    fn static_declaration_is_usable() {
        static CACHE: SharedCache<u64, u64> = SharedCache::new();
        CACHE.initialize(4).unwrap();
        CACHE.put(7, 49);
        assert_eq!(CACHE.get(&7), Some(49));
    }

    #[test]
    fn sharded_variant_pre_init_is_inert() {
        let shared: SharedShardedCache<u64, u64> = SharedShardedCache::new();
        shared.put(1, 10);
        assert_eq!(shared.get(&1), None);
        assert_eq!(shared.shard_count(), 0);
        assert_eq!(shared.capacity(), 0);
    }

    #[test]
    fn sharded_variant_initialize_once() {
        let shared: SharedShardedCache<u64, u64> = SharedShardedCache::new();
        shared.initialize(4, 64).unwrap();
        shared.initialize(16, 1024).unwrap();
        assert_eq!(shared.shard_count(), 4);
        assert_eq!(shared.capacity(), 64);

        shared.put(1, 10);
        assert_eq!(shared.get(&1), Some(10));
        assert!(shared.contains(&1));
    }

    #[test]
    fn sharded_variant_rejects_bad_sizing() {
        let shared: SharedShardedCache<u64, u64> = SharedShardedCache::new();
        assert!(shared.initialize(0, 64).is_err());
        assert!(shared.initialize(4, 0).is_err());
        assert!(!shared.is_initialized());
    }
}
