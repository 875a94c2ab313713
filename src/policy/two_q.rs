//! # 2Q (two-queue)
//!
//! Splits tracked keys into a newcomer queue (`A1`) and a proven queue
//! (`Am`). A key enters at the front of `A1`; its first hit promotes it to
//! the front of `Am`, and later hits splice it back to the `Am` front.
//! Eviction drains `A1` from the back first, so one-shot keys never displace
//! proven ones.
//!
//! ```text
//!   insert(k) ──► A1: [k] ◄──► … ◄── tail ─► first victim
//!                      │ hit
//!                      ▼
//!                 Am: [k] ◄──► … ◄── tail ─► fallback victim
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::key_list::{KeyList, NodeId};
use crate::error::ConfigError;
use crate::policy::{check_reserve_cap, EvictionPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Queue {
    Newcomer,
    Proven,
}

#[derive(Debug)]
pub struct TwoQPolicy<K> {
    newcomers: KeyList<K>,
    proven: KeyList<K>,
    pos: FxHashMap<K, (Queue, NodeId)>,
    reserved: usize,
}

impl<K> TwoQPolicy<K> {
    pub fn new() -> Self {
        Self {
            newcomers: KeyList::new(),
            proven: KeyList::new(),
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

impl<K> Default for TwoQPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for TwoQPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        let id = self.newcomers.push_front(key.clone());
        self.pos.insert(key, (Queue::Newcomer, id));
    }

    fn on_access(&mut self, key: &K) -> bool {
        let (queue, id) = match self.pos.get(key) {
            Some(&entry) => entry,
            None => return false,
        };
        match queue {
            Queue::Proven => self.proven.move_to_front(id),
            Queue::Newcomer => {
                // First re-access proves the key
                match self.newcomers.remove(id) {
                    Some(owned) => {
                        let new_id = self.proven.push_front(owned);
                        self.pos.insert(key.clone(), (Queue::Proven, new_id));
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn on_remove(&mut self, key: &K) {
        if let Some((queue, id)) = self.pos.remove(key) {
            match queue {
                Queue::Newcomer => self.newcomers.remove(id),
                Queue::Proven => self.proven.remove(id),
            };
        }
    }

    fn on_clear(&mut self) {
        self.newcomers.clear();
        self.proven.clear();
        self.pos.clear();
    }

    fn select_for_eviction(&mut self) -> Option<K> {
        self.newcomers
            .back()
            .or_else(|| self.proven.back())
            .cloned()
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
