//! # Cache Handle Contract
//!
//! [`Cache`] is the operation set every cache variant in this crate exposes,
//! whether plain ([`PolicyCache`](crate::cache::PolicyCache)), sharded
//! ([`ShardedCache`](crate::sharded::ShardedCache)), or process-global
//! ([`SharedCache`](crate::shared::SharedCache)). Call sites that only need
//! "a cache" (the memoization helpers, tests, generic plumbing) bound on
//! this trait instead of a concrete composition.
//!
//! All operations take `&self`: synchronization is interior, chosen by the
//! cache's lock parameter, and `is_mt_safe()` reports whether that choice
//! actually tolerates concurrent callers.
//!
//! ## Example
//!
//! ```
//! use memokit::cache::LruCache;
//! use memokit::traits::Cache;
//!
//! fn warm<C: Cache<u64, String>>(cache: &C, entries: &[(u64, &str)]) {
//!     for (key, value) in entries {
//!         cache.put(*key, value.to_string());
//!     }
//! }
//!
//! let cache: LruCache<u64, String> = LruCache::try_new(16).unwrap();
//! warm(&cache, &[(1, "one"), (2, "two")]);
//! assert_eq!(cache.len(), 2);
//! ```

/// Operations shared by every cache variant.
pub trait Cache<K, V> {
    /// Looks up `key`, counting a hit as an access under the eviction
    /// policy. Returns a copy of the value.
    fn get(&self, key: &K) -> Option<V>;

    /// Inserts or overwrites `key`. Overwrites count as accesses and never
    /// evict; fresh inserts into a full cache evict the policy's victim
    /// first.
    fn put(&self, key: K, value: V);

    /// Drops every entry. Never fails.
    fn clear(&self);

    /// Current number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the cache holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured maximum number of entries.
    fn capacity(&self) -> usize;

    /// Membership probe that does not count as an access.
    fn contains(&self, key: &K) -> bool;

    /// Returns `false` exactly when the no-op locking regime is selected.
    fn is_mt_safe(&self) -> bool;
}
