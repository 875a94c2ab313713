//! # Segmented LRU (SLRU)
//!
//! Two LRU segments: keys start in `probation` and are promoted to
//! `protected` on their first hit. The protected segment is capped at
//! `max(1, ⌊0.67 · capacity⌋)`; promotions that overflow it demote the
//! protected tail back to the probation front. Eviction takes the probation
//! tail first, so a key must earn a hit to outlive a burst of inserts.
//!
//! ```text
//!   insert(k) ──► probation: [k] ◄──► … ◄── tail ─► first victim
//!                      │ hit                 ▲
//!                      ▼                     │ demote on overflow
//!                 protected: [k] ◄──► … ◄── tail ─► fallback victim
//! ```

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::key_list::{KeyList, NodeId};
use crate::error::ConfigError;
use crate::policy::{check_reserve_cap, EvictionPolicy};

/// Fraction of the reserved capacity granted to the protected segment.
const PROTECTED_RATIO: f64 = 0.67;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Probation,
    Protected,
}

#[derive(Debug)]
pub struct SlruPolicy<K> {
    probation: KeyList<K>,
    protected: KeyList<K>,
    pos: FxHashMap<K, (Segment, NodeId)>,
    reserved: usize,
    protected_cap: usize,
}

impl<K> SlruPolicy<K> {
    pub fn new() -> Self {
        Self {
            probation: KeyList::new(),
            protected: KeyList::new(),
            pos: FxHashMap::default(),
            reserved: 0,
            protected_cap: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Current protected-segment cap; 0 until `reserve` establishes one.
    pub fn protected_cap(&self) -> usize {
        self.protected_cap
    }
}

impl<K> SlruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn enforce_protected_cap(&mut self) {
        while self.protected_cap > 0 && self.protected.len() > self.protected_cap {
            let Some(demoted) = self.protected.pop_back() else {
                break;
            };
            let id = self.probation.push_front(demoted.clone());
            self.pos.insert(demoted, (Segment::Probation, id));
        }
    }
}

impl<K> Default for SlruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for SlruPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        let id = self.probation.push_front(key.clone());
        self.pos.insert(key, (Segment::Probation, id));
    }

    fn on_access(&mut self, key: &K) -> bool {
        let (segment, id) = match self.pos.get(key) {
            Some(&entry) => entry,
            None => return false,
        };
        match segment {
            Segment::Protected => self.protected.move_to_front(id),
            Segment::Probation => match self.probation.remove(id) {
                Some(owned) => {
                    let new_id = self.protected.push_front(owned);
                    self.pos.insert(key.clone(), (Segment::Protected, new_id));
                    self.enforce_protected_cap();
                    true
                }
                None => false,
            },
        }
    }

    fn on_remove(&mut self, key: &K) {
        if let Some((segment, id)) = self.pos.remove(key) {
            match segment {
                Segment::Probation => self.probation.remove(id),
                Segment::Protected => self.protected.remove(id),
            };
        }
    }

    fn on_clear(&mut self) {
        self.probation.clear();
        self.protected.clear();
        self.pos.clear();
    }

    fn select_for_eviction(&mut self) -> Option<K> {
        self.probation
            .back()
            .or_else(|| self.protected.back())
            .cloned()
    }

    fn reserve(&mut self, cap: usize) -> Result<(), ConfigError> {
        check_reserve_cap(cap)?;
        if cap > self.reserved {
            self.reserved = cap;
            self.pos.reserve(cap.saturating_sub(self.pos.len()));
        }
        self.protected_cap = ((PROTECTED_RATIO * self.reserved as f64) as usize).max(1);
        Ok(())
    }
}
