//! # Most Recently Used (MRU)
//!
//! The mirror image of LRU: the same recency list, but fresh activity lands
//! at the back and the back is the victim. Insertion counts as a use, so with
//! no intervening hits the newest key goes first, which helps when the newest
//! entries are the least likely to be asked for again (cyclic scans).
//!
//! ```text
//!   insert(k)  ─► push back
//!   access(k)  ─► splice to back
//!
//!   head ─► [A] ◄──► [C] ◄──► [D] ◄── tail
//!           oldest            MRU ─► victim
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::key_list::{KeyList, NodeId};
use crate::error::ConfigError;
use crate::policy::{check_reserve_cap, EvictionPolicy};

#[derive(Debug)]
pub struct MruPolicy<K> {
    order: KeyList<K>,
    pos: FxHashMap<K, NodeId>,
    reserved: usize,
}

impl<K> MruPolicy<K> {
    pub fn new() -> Self {
        Self {
            order: KeyList::new(),
            pos: FxHashMap::default(),
            reserved: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}

impl<K> Default for MruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for MruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        let id = self.order.push_back(key.clone());
        self.pos.insert(key, id);
    }

    fn on_access(&mut self, key: &K) -> bool {
        match self.pos.get(key) {
            Some(&id) => self.order.move_to_back(id),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_most_recently_used() {
        let mut policy = MruPolicy::new();
        policy.on_insert(1);
        policy.on_insert(2);
        policy.on_insert(3);

        // Touching 2 makes it the victim
        assert!(policy.on_access(&2));
        assert_eq!(policy.select_for_eviction(), Some(2));
    }

    #[test]
    fn pure_inserts_evict_newest_first() {
        let mut policy = MruPolicy::new();
        policy.on_insert("a");
        policy.on_insert("b");
        policy.on_insert("c");
        assert_eq!(policy.select_for_eviction(), Some("c"));
    }

    #[test]
    fn access_untracked_reports_absent() {
        let mut policy: MruPolicy<u32> = MruPolicy::new();
        policy.on_insert(1);
        assert!(!policy.on_access(&9));
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn remove_then_select_skips_removed() {
        let mut policy = MruPolicy::new();
        policy.on_insert(1);
        policy.on_insert(2);
        policy.on_remove(&2);
        assert_eq!(policy.select_for_eviction(), Some(1));
    }

    #[test]
    fn reserve_rejects_zero() {
        let mut policy: MruPolicy<u32> = MruPolicy::new();
        assert!(policy.reserve(0).is_err());
        assert!(policy.reserve(4).is_ok());
    }
}
