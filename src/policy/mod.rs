//! # Eviction Policies
//!
//! An eviction policy maintains per-key bookkeeping (recency lists, queue
//! membership, frequency buckets, hit counters) and selects a victim when the
//! cache core is full. Policies track keys only (values stay in the core's
//! index) and every policy operation runs in O(1) or small bounded time.
//!
//! ## The contract
//!
//! | Operation              | Meaning                                        |
//! |------------------------|------------------------------------------------|
//! | `on_insert(k)`         | `k` has just entered the cache (`k` untracked) |
//! | `on_access(&k) → bool` | read/write hit on `k`; `false` when untracked  |
//! | `on_remove(&k)`        | `k` is being removed; no-op when untracked     |
//! | `on_clear()`           | drop all bookkeeping                           |
//! | `select_for_eviction()`| some tracked key, or `None` when empty         |
//! | `reserve(cap)`         | pre-size for `cap` keys; rejects `cap < 1`     |
//!
//! `select_for_eviction` is idempotent: two calls with no mutation in between
//! return the same key. `on_access` never resurrects an untracked key: it
//! reports absence and leaves state alone, and the cache core treats that
//! report as a desync signal.
//!
//! ## Provided policies
//!
//! | Policy                        | Victim                                  |
//! |-------------------------------|-----------------------------------------|
//! | [`lru::LruPolicy`]            | least recently used                     |
//! | [`mru::MruPolicy`]            | most recently used                      |
//! | [`fifo::FifoPolicy`]          | oldest inserted                         |
//! | [`two_q::TwoQPolicy`]         | newcomer queue tail, else proven tail   |
//! | [`slru::SlruPolicy`]          | probation tail, else protected tail     |
//! | [`lfu::LfuPolicy`]            | least frequently used (LRU tie-break)   |
//! | [`halving_lfu::HalvingLfuPolicy`] | LFU with periodic frequency halving |
//! | [`redis_lfu::RedisLfuPolicy`] | sampled lowest probabilistic hit count  |

pub mod fifo;
pub mod halving_lfu;
pub mod lfu;
pub mod lru;
pub mod mru;
pub mod redis_lfu;
pub mod slru;
pub mod two_q;

pub use fifo::FifoPolicy;
pub use halving_lfu::HalvingLfuPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use redis_lfu::RedisLfuPolicy;
pub use slru::SlruPolicy;
pub use two_q::TwoQPolicy;

use crate::error::ConfigError;

/// Bookkeeping contract every eviction policy implements.
///
/// Usable directly for unit testing a policy, and consumed by
/// [`PolicyCache`](crate::cache::PolicyCache) which keeps the policy in
/// lockstep with its index.
pub trait EvictionPolicy<K> {
    /// Records that `key` has just entered the cache.
    ///
    /// Precondition: `key` is not tracked. Must not fail.
    fn on_insert(&mut self, key: K);

    /// Records a read or write hit on `key`.
    ///
    /// Returns `false` when `key` is not tracked; the policy never silently
    /// starts tracking it.
    fn on_access(&mut self, key: &K) -> bool;

    /// Records that `key` is being removed. No-op when untracked.
    fn on_remove(&mut self, key: &K);

    /// Drops all bookkeeping.
    fn on_clear(&mut self);

    /// Returns some tracked key to evict, or `None` when empty.
    ///
    /// Idempotent between mutations: the same key is returned until the next
    /// `on_insert` / `on_access` / `on_remove` / `on_clear`.
    fn select_for_eviction(&mut self) -> Option<K>;

    /// Hints that up to `cap` keys will be tracked; pre-sizes internal maps.
    ///
    /// Grow-only: reserving less than an earlier reservation is a no-op.
    /// Rejects `cap < 1`.
    fn reserve(&mut self, cap: usize) -> Result<(), ConfigError>;
}

impl<K, P> EvictionPolicy<K> for Box<P>
where
    P: EvictionPolicy<K> + ?Sized,
{
    fn on_insert(&mut self, key: K) {
        (**self).on_insert(key)
    }

    fn on_access(&mut self, key: &K) -> bool {
        (**self).on_access(key)
    }

    fn on_remove(&mut self, key: &K) {
        (**self).on_remove(key)
    }

    fn on_clear(&mut self) {
        (**self).on_clear()
    }

    fn select_for_eviction(&mut self) -> Option<K> {
        (**self).select_for_eviction()
    }

    fn reserve(&mut self, cap: usize) -> Result<(), ConfigError> {
        (**self).reserve(cap)
    }
}

pub(crate) fn check_reserve_cap(cap: usize) -> Result<(), ConfigError> {
    if cap < 1 {
        return Err(ConfigError::new("cannot reserve a zero capacity"));
    }
    Ok(())
}
