//! # Least Recently Used (LRU)
//!
//! Maintains a single recency list with a side map `key → node`. Insertions
//! and hits go to the front; the victim is the back, the key untouched for
//! the longest.
//!
//! ```text
//!   insert(k)  ─► push front
//!   access(k)  ─► splice to front
//!
//!   head ─► [D] ◄──► [A] ◄──► [C] ◄── tail
//!           MRU                LRU ─► victim
//! ```
//!
//! ## Example
//!
//! ```
//! use memokit::policy::{EvictionPolicy, LruPolicy};
//!
//! let mut policy: LruPolicy<u32> = LruPolicy::new();
//! policy.on_insert(1);
//! policy.on_insert(2);
//! policy.on_insert(3);
//!
//! // Touch 1, so 2 becomes the coldest key
//! assert!(policy.on_access(&1));
//! assert_eq!(policy.select_for_eviction(), Some(2));
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::key_list::{KeyList, NodeId};
use crate::error::ConfigError;
use crate::policy::{check_reserve_cap, EvictionPolicy};

#[derive(Debug)]
pub struct LruPolicy<K> {
    order: KeyList<K>,
    pos: FxHashMap<K, NodeId>,
    reserved: usize,
}

impl<K> LruPolicy<K> {
    pub fn new() -> Self {
        Self {
            order: KeyList::new(),
            pos: FxHashMap::default(),
            reserved: 0,
        }
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

impl<K> Default for LruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        let id = self.order.push_front(key.clone());
        self.pos.insert(key, id);
    }

    fn on_access(&mut self, key: &K) -> bool {
        match self.pos.get(key) {
            Some(&id) => self.order.move_to_front(id),
            None => false,
        }
    }

    fn on_remove(&mut self, key: &K) {
        if let Some(id) = self.pos.remove(key) {
            self.order.remove(id);
        }
    }

    fn on_clear(&mut self) {
        self.order.clear();
        self.pos.clear();
    }

    fn select_for_eviction(&mut self) -> Option<K> {
        self.order.back().cloned()
    }

    fn reserve(&mut self, cap: usize) -> Result<(), ConfigError> {
        check_reserve_cap(cap)?;
        if cap > self.reserved {
            self.reserved = cap;
            self.pos.reserve(cap.saturating_sub(self.pos.len()));
        }
        Ok(())
    }
}
