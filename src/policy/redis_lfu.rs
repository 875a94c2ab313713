//! # Redis-style probabilistic LFU
//!
//! Approximate frequency tracking in two bytes per key, after the Redis
//! `maxmemory-policy allkeys-lfu` scheme:
//!
//! - `hits`: an 8-bit saturating counter. An access increments it only with
//!   probability `1 / (hits · LOG_FACTOR + 1)`, so the counter grows
//!   logarithmically with the true access count.
//! - `ldt`: a 16-bit minute-truncated timestamp. Before any counter update,
//!   the key is decayed by one hit per [`DECAY_TIME`] minutes elapsed since
//!   `ldt`, so historically hot keys that went cold age out.
//!
//! Eviction does not keep a full order. A recency list exists purely for
//! sampling: selection walks from the front with random 1..=7 jumps, gathers
//! up to [`SAMPLE_SIZE`] candidates, decays each, and picks the lowest
//! `hits`, breaking ties toward the lower (older) `ldt`. The chosen victim
//! is remembered so that repeated selection without intervening mutation is
//! stable.
//!
//! Randomness comes from an internal xorshift64 state; no system entropy and
//! no RNG dependency on the hot path.

use std::hash::Hash;
use std::time::Instant;

use rustc_hash::FxHashMap;

use crate::ds::key_list::{KeyList, NodeId};
use crate::error::ConfigError;
use crate::policy::{check_reserve_cap, EvictionPolicy};

/// Keys inspected per eviction selection.
pub const SAMPLE_SIZE: usize = 5;

/// Counter growth damping: increment probability is `1 / (hits · LOG_FACTOR + 1)`.
pub const LOG_FACTOR: u32 = 10;

/// Minutes of inactivity that decay one hit.
pub const DECAY_TIME: u16 = 1;

#[derive(Debug, Clone, Copy)]
struct HitMeta {
    hits: u8,
    ldt: u16,
}

#[derive(Debug)]
pub struct RedisLfuPolicy<K> {
    meta: FxHashMap<K, HitMeta>,
    /// Recency list used only as the sampling population.
    sample: KeyList<K>,
    pos: FxHashMap<K, NodeId>,
    rng_state: u64,
    epoch: Instant,
    /// Added to the wall reading; only test code moves it.
    clock_skew: u16,
    pending: Option<K>,
    reserved: usize,
}

impl<K> RedisLfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            meta: FxHashMap::default(),
            sample: KeyList::new(),
            pos: FxHashMap::default(),
            rng_state: 0x9e37_79b9_7f4a_7c15,
            epoch: Instant::now(),
            clock_skew: 0,
            pending: None,
            reserved: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Stored hit counter for a tracked key, without applying decay.
    pub fn hits(&self, key: &K) -> Option<u8> {
        self.meta.get(key).map(|m| m.hits)
    }

    fn now_minutes(&self) -> u16 {
        ((self.epoch.elapsed().as_secs() / 60) as u16).wrapping_add(self.clock_skew)
    }

    /// XorShift64; fast and deterministic, no system entropy.
    fn next_random(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        x
    }

    fn decay_key(&mut self, key: &K, now: u16) {
        if let Some(m) = self.meta.get_mut(key) {
            let elapsed = now.wrapping_sub(m.ldt);
            if elapsed == 0 {
                return;
            }
            let decrements = elapsed / DECAY_TIME;
            if decrements > 0 {
                m.hits = m.hits.saturating_sub(decrements.min(u8::MAX as u16) as u8);
                m.ldt = now;
            }
        }
    }

    fn maybe_increment(&mut self, key: &K, rnd: u64) {
        if let Some(m) = self.meta.get_mut(key) {
            if m.hits == u8::MAX {
                return;
            }
            let denom = m.hits as u64 * LOG_FACTOR as u64 + 1;
            if rnd % denom == 0 {
                m.hits = m.hits.saturating_add(1);
            }
        }
    }

    #[cfg(test)]
    fn advance_minutes(&mut self, minutes: u16) {
        self.clock_skew = self.clock_skew.wrapping_add(minutes);
    }
}

impl<K> Default for RedisLfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> EvictionPolicy<K> for RedisLfuPolicy<K>
where
    K: Eq + Hash + Clone,
{
    fn on_insert(&mut self, key: K) {
        self.pending = None;
        let now = self.now_minutes();
        let id = self.sample.push_front(key.clone());
        self.pos.insert(key.clone(), id);
        self.meta.insert(key, HitMeta { hits: 0, ldt: now });
    }

    fn on_access(&mut self, key: &K) -> bool {
        self.pending = None;
        let id = match self.pos.get(key) {
            Some(&id) => id,
            None => return false,
        };
        let now = self.now_minutes();
        self.decay_key(key, now);
        let rnd = self.next_random();
        self.maybe_increment(key, rnd);
        self.sample.move_to_front(id)
    }

    fn on_remove(&mut self, key: &K) {
        self.pending = None;
        if let Some(id) = self.pos.remove(key) {
            self.sample.remove(id);
        }
        self.meta.remove(key);
    }

    fn on_clear(&mut self) {
        self.meta.clear();
        self.sample.clear();
        self.pos.clear();
        self.pending = None;
    }

    fn select_for_eviction(&mut self) -> Option<K> {
        if let Some(key) = self.pending.clone() {
            if self.pos.contains_key(&key) {
                return Some(key);
            }
            self.pending = None;
        }
        if self.sample.is_empty() {
            return None;
        }

        // Jump widths are drawn before the walk so the RNG does not contend
        // with the list borrow.
        let mut jumps = [0u64; SAMPLE_SIZE];
        for jump in jumps.iter_mut() {
            *jump = 1 + self.next_random() % 7;
        }

        let mut candidates: Vec<K> = Vec::with_capacity(SAMPLE_SIZE);
        {
            let mut iter = self.sample.iter();
            'walk: for &jump in jumps.iter() {
                match iter.next() {
                    Some(key) => candidates.push(key.clone()),
                    None => break,
                }
                // The iterator already advanced past the candidate.
                for _ in 1..jump {
                    if iter.next().is_none() {
                        break 'walk;
                    }
                }
            }
        }

        let now = self.now_minutes();
        let mut worst: Option<(K, HitMeta)> = None;
        for key in candidates {
            self.decay_key(&key, now);
            let m = match self.meta.get(&key) {
                Some(m) => *m,
                None => continue,
            };
            let is_worse = match &worst {
                None => true,
                Some((_, w)) => m.hits < w.hits || (m.hits == w.hits && m.ldt < w.ldt),
            };
            if is_worse {
                worst = Some((key, m));
            }
        }

        let victim = worst.map(|(key, _)| key);
        self.pending = victim.clone();
        victim
    }

    fn reserve(&mut self, cap: usize) -> Result<(), ConfigError> {
        check_reserve_cap(cap)?;
        if cap > self.reserved {
            self.reserved = cap;
            self.meta.reserve(cap.saturating_sub(self.meta.len()));
            self.pos.reserve(cap.saturating_sub(self.pos.len()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_starts_at_zero_hits() {
        let mut policy = RedisLfuPolicy::new();
        policy.on_insert(1);
        assert_eq!(policy.hits(&1), Some(0));
    }

    #[test]
    fn first_access_always_increments() {
        // At hits = 0 the increment probability is 1/(0·10 + 1) = 1.
        let mut policy = RedisLfuPolicy::new();
        policy.on_insert(1);
        assert!(policy.on_access(&1));
        assert_eq!(policy.hits(&1), Some(1));
    }

    #[test]
    fn hammering_grows_the_counter_sublinearly() {
        let mut policy = RedisLfuPolicy::new();
        policy.on_insert(1);
        for _ in 0..500 {
            policy.on_access(&1);
        }
        let hits = policy.hits(&1).unwrap();
        assert!(hits >= 2, "500 accesses left hits at {hits}");
        assert!((hits as usize) < 500);
    }

    #[test]
    fn access_untracked_reports_absent() {
        let mut policy: RedisLfuPolicy<u32> = RedisLfuPolicy::new();
        assert!(!policy.on_access(&1));
        assert!(policy.is_empty());
    }

    #[test]
    fn sampling_picks_lowest_hit_count() {
        let mut policy = RedisLfuPolicy::new();
        // A population of cold keys behind the hot front key guarantees the
        // sample holds the hot key plus at least one cold candidate.
        for i in 0..10 {
            policy.on_insert(i);
        }
        policy.on_insert(100);
        for _ in 0..200 {
            policy.on_access(&100);
        }
        assert!(policy.hits(&100).unwrap() >= 2);

        let victim = policy.select_for_eviction().unwrap();
        assert_ne!(victim, 100);
        assert_eq!(policy.hits(&victim), Some(0));
    }

    #[test]
    fn selection_is_idempotent_between_mutations() {
        let mut policy = RedisLfuPolicy::new();
        for i in 0..20 {
            policy.on_insert(i);
        }
        let first = policy.select_for_eviction();
        assert!(first.is_some());
        assert_eq!(policy.select_for_eviction(), first);
        assert_eq!(policy.select_for_eviction(), first);

        // A mutation invalidates the cached choice
        policy.on_insert(99);
        let _ = policy.select_for_eviction();
    }

    #[test]
    fn idle_keys_decay_over_minutes() {
        let mut policy = RedisLfuPolicy::new();
        policy.on_insert(1);
        for _ in 0..500 {
            policy.on_access(&1);
        }
        let hits = policy.hits(&1).unwrap();
        assert!(hits >= 2);

        // Sit idle past hits·DECAY_TIME minutes, then let selection decay it
        policy.advance_minutes((hits as u16 + 1) * DECAY_TIME);
        let _ = policy.select_for_eviction();
        assert_eq!(policy.hits(&1), Some(0));
    }

    #[test]
    fn decayed_front_key_is_evictable_again() {
        let mut policy = RedisLfuPolicy::new();
        for i in 0..10 {
            policy.on_insert(i);
            policy.on_access(&i); // every background key at hits 1
        }
        policy.on_insert(100);
        for _ in 0..500 {
            policy.on_access(&100);
        }
        assert!(policy.hits(&100).unwrap() >= 2);

        // A long cold spell wipes the hot key's advantage; sampling decays it
        // to 0, below the hits-1 population, and it sits at the sampled front.
        policy.advance_minutes(u8::MAX as u16 + 1);
        let victim = policy.select_for_eviction();
        assert_eq!(victim, Some(100));
    }

    #[test]
    fn remove_drops_all_tracking() {
        let mut policy = RedisLfuPolicy::new();
        policy.on_insert(1);
        policy.on_remove(&1);
        assert!(policy.is_empty());
        assert_eq!(policy.hits(&1), None);
        assert_eq!(policy.select_for_eviction(), None);
    }

    #[test]
    fn clear_then_select_is_none() {
        let mut policy = RedisLfuPolicy::new();
        policy.on_insert(1);
        policy.on_insert(2);
        policy.on_clear();
        assert_eq!(policy.select_for_eviction(), None);
    }

    #[test]
    fn reserve_rejects_zero() {
        let mut policy: RedisLfuPolicy<u32> = RedisLfuPolicy::new();
        assert!(policy.reserve(0).is_err());
        assert!(policy.reserve(32).is_ok());
    }
}
