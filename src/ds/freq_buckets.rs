//! Frequency buckets for the LFU policy family.
//!
//! Keys are grouped into buckets by access frequency. Each bucket is a
//! [`KeyList`] ordered by recency (push-front on arrival, evict from the
//! tail), so ties within a frequency resolve LRU-first. A running `min_freq`
//! tracks the cheapest bucket; removals may leave it stale, in which case
//! [`peek_min`](FreqBuckets::peek_min) rescans for the smallest non-empty
//! bucket before answering.
//!
//! ```text
//!   buckets: freq → KeyList<K>          pos: K → (freq, NodeId)
//!
//!   freq 1:  head ─► [d] ◄──► [c] ◄── tail   ← min_freq
//!   freq 3:  head ─► [a] ◄── tail
//!   freq 7:  head ─► [b] ◄── tail
//! ```
//!
//! The aging LFU variant calls [`halve`](FreqBuckets::halve), which relocates
//! every key to `max(1, freq / 2)` and recomputes `min_freq`.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::key_list::{KeyList, NodeId};

#[derive(Debug)]
pub struct FreqBuckets<K> {
    buckets: FxHashMap<u64, KeyList<K>>,
    pos: FxHashMap<K, (u64, NodeId)>,
    min_freq: u64,
}

impl<K> FreqBuckets<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            buckets: FxHashMap::default(),
            pos: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Pre-sizes the position map for up to `cap` keys. Grow-only.
    pub fn reserve(&mut self, cap: usize) {
        self.pos.reserve(cap.saturating_sub(self.pos.len()));
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.pos.contains_key(key)
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.pos.get(key).map(|&(freq, _)| freq)
    }

    /// Tracks a new key at frequency 1. Returns `false` if already tracked.
    pub fn insert(&mut self, key: K) -> bool {
        if self.pos.contains_key(&key) {
            return false;
        }
        let list = self.buckets.entry(1).or_default();
        let id = list.push_front(key.clone());
        self.pos.insert(key, (1, id));
        self.min_freq = 1;
        true
    }

    /// Moves a key one bucket up and refreshes its recency. Returns the new
    /// frequency, or `None` if the key is untracked.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let (freq, id) = *self.pos.get(key)?;
        let next_freq = freq.saturating_add(1);

        if next_freq == freq {
            // Saturated: refresh recency within the same bucket.
            let list = self.buckets.get_mut(&freq)?;
            let owned = list.remove(id)?;
            let new_id = list.push_front(owned);
            self.pos.insert(key.clone(), (freq, new_id));
            return Some(freq);
        }

        let owned = {
            let list = self.buckets.get_mut(&freq)?;
            let owned = list.remove(id)?;
            if list.is_empty() {
                self.buckets.remove(&freq);
                if self.min_freq == freq {
                    self.min_freq = next_freq;
                }
            }
            owned
        };

        let list = self.buckets.entry(next_freq).or_default();
        let new_id = list.push_front(owned);
        self.pos.insert(key.clone(), (next_freq, new_id));
        Some(next_freq)
    }

    /// Stops tracking a key. Returns its last frequency, or `None` if
    /// untracked. `min_freq` may go stale; `peek_min` recovers it.
    pub fn remove(&mut self, key: &K) -> Option<u64> {
        let (freq, id) = self.pos.remove(key)?;
        if let Some(list) = self.buckets.get_mut(&freq) {
            list.remove(id);
            if list.is_empty() {
                self.buckets.remove(&freq);
            }
        }
        if self.pos.is_empty() {
            self.min_freq = 0;
        }
        Some(freq)
    }

    /// Returns the LRU key of the lowest non-empty bucket, rescanning when
    /// the cached `min_freq` no longer points at a live bucket.
    pub fn peek_min(&mut self) -> Option<&K> {
        if self.pos.is_empty() {
            return None;
        }
        let stale = self
            .buckets
            .get(&self.min_freq)
            .map(|list| list.is_empty())
            .unwrap_or(true);
        if stale {
            self.min_freq = self
                .buckets
                .iter()
                .filter(|(_, list)| !list.is_empty())
                .map(|(&freq, _)| freq)
                .min()?;
        }
        self.buckets.get(&self.min_freq).and_then(|list| list.back())
    }

    /// Ages every key to `max(1, freq / 2)` and recomputes `min_freq`.
    pub fn halve(&mut self) {
        let moves: Vec<(K, u64)> = self
            .pos
            .iter()
            .filter(|(_, entry)| entry.0 > 1)
            .map(|(key, entry)| (key.clone(), entry.0))
            .collect();

        for (key, old_freq) in moves {
            let new_freq = (old_freq / 2).max(1);
            let id = match self.pos.get(&key) {
                Some(&(_, id)) => id,
                None => continue,
            };
            let owned = match self.buckets.get_mut(&old_freq) {
                Some(list) => {
                    let owned = list.remove(id);
                    if list.is_empty() {
                        self.buckets.remove(&old_freq);
                    }
                    owned
                }
                None => None,
            };
            let Some(owned) = owned else { continue };
            let list = self.buckets.entry(new_freq).or_default();
            let new_id = list.push_front(owned);
            self.pos.insert(key, (new_freq, new_id));
        }

        self.min_freq = self
            .buckets
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(&freq, _)| freq)
            .min()
            .unwrap_or(0);
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.pos.clear();
        self.min_freq = 0;
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self)
    where
        K: std::fmt::Debug,
    {
        let bucket_total: usize = self.buckets.values().map(|list| list.len()).sum();
        assert_eq!(bucket_total, self.pos.len());

        if self.pos.is_empty() {
            assert!(self.buckets.is_empty());
            assert_eq!(self.min_freq, 0);
            return;
        }
        assert!(self.min_freq > 0);

        for (freq, list) in &self.buckets {
            assert!(!list.is_empty(), "bucket {freq} left empty");
        }
        for (key, &(freq, id)) in &self.pos {
            let list = self.buckets.get(&freq).expect("bucket missing for key");
            assert_eq!(list.key_at(id), Some(key));
        }
    }
}

impl<K> Default for FreqBuckets<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
