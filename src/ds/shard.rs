//! Deterministic key-to-shard routing for the sharded cache.
//!
//! A key's shard is `hash(key) % shards`, computed with the same `FxHasher`
//! the cache cores use for their index maps, so a key hashes identically on
//! both sides of the shard boundary.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::ds::ShardSelector;
//!
//! let selector = ShardSelector::new(4);
//! let shard = selector.shard_for_key(&"user:123");
//! assert!(shard < 4);
//!
//! // Same key always maps to the same shard
//! assert_eq!(selector.shard_for_key(&"user:123"), shard);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Deterministic shard selector over the index hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards. Clamped to at least 1.
    pub fn new(shards: usize) -> Self {
        Self {
            shards: shards.max(1),
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    pub fn shard_for_key<K: Hash + ?Sized>(&self, key: &K) -> usize {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Creates a single-shard selector.
    fn default() -> Self {
        Self::new(1)
    }
}
