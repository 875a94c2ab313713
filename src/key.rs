//! # Composite Keys
//!
//! [`CompositeKey`] turns an ordered tuple of field values into a cache key:
//! equality is per-field, and the hash folds per-field digests with the
//! golden-ratio mixing step
//! `acc ^ (h + 0x9e3779b97f4a7c15 + (acc << 6) + (acc >> 2))`, so field
//! order is significant. The memoization pattern builds one from a method's
//! argument tuple and uses it against a registry-provided cache.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::key::CompositeKey;
//!
//! let a = CompositeKey::new((42u64, "norm".to_string()));
//! let b = CompositeKey::new((42u64, "norm".to_string()));
//! let c = CompositeKey::new((7u64, "norm".to_string()));
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(a.fields().0, 42);
//! ```

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// One golden-ratio fold step.
#[inline]
pub(crate) fn fold(acc: u64, h: u64) -> u64 {
    acc ^ h
        .wrapping_add(0x9e37_79b9_7f4a_7c15)
        .wrapping_add(acc << 6)
        .wrapping_add(acc >> 2)
}

/// Digest of a single field under the crate's index hasher.
#[inline]
pub(crate) fn hash_field<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Structural key over a fixed tuple of field types.
///
/// Equality compares field by field; hashing folds per-field digests in
/// field order. Supported for tuples of 1 through 8 fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeKey<T>(T);

impl<T> CompositeKey<T> {
    /// Wraps a tuple of field values.
    pub fn new(fields: T) -> Self {
        Self(fields)
    }

    /// Borrows the underlying field tuple.
    pub fn fields(&self) -> &T {
        &self.0
    }

    /// Unwraps the underlying field tuple.
    pub fn into_fields(self) -> T {
        self.0
    }
}

impl<T> From<T> for CompositeKey<T> {
    fn from(fields: T) -> Self {
        Self::new(fields)
    }
}

macro_rules! impl_composite_hash {
    ($( ( $($field:ident => $idx:tt),+ ) )+) => {
        $(
            impl<$($field: Hash),+> Hash for CompositeKey<($($field,)+)> {
                fn hash<H: Hasher>(&self, state: &mut H) {
                    let mut acc = 0u64;
                    $( acc = fold(acc, hash_field(&(self.0).$idx)); )+
                    state.write_u64(acc);
                }
            }
        )+
    };
}

impl_composite_hash! {
    (T1 => 0)
    (T1 => 0, T2 => 1)
    (T1 => 0, T2 => 1, T3 => 2)
    (T1 => 0, T2 => 1, T3 => 2, T4 => 3)
    (T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4)
    (T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4, T6 => 5)
    (T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4, T6 => 5, T7 => 6)
    (T1 => 0, T2 => 1, T3 => 2, T4 => 3, T5 => 4, T6 => 5, T7 => 6, T8 => 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = FxHasher::default();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_fields_mean_equal_keys_and_hashes() {
        let a = CompositeKey::new((1u32, "x".to_string(), 3.5f64.to_bits()));
        let b = CompositeKey::new((1u32, "x".to_string(), 3.5f64.to_bits()));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn any_field_difference_breaks_equality() {
        let a = CompositeKey::new((1u32, 2u32));
        let b = CompositeKey::new((1u32, 3u32));
        let c = CompositeKey::new((9u32, 2u32));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn field_order_is_significant() {
        let ab = CompositeKey::new((1u64, 2u64));
        let ba = CompositeKey::new((2u64, 1u64));
        assert_ne!(ab, ba);
        assert_ne!(hash_of(&ab), hash_of(&ba));
    }

    #[test]
    fn single_field_key_works() {
        let a = CompositeKey::new((7u8,));
        let b = CompositeKey::new((7u8,));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn usable_as_cache_key() {
        use crate::cache::LruCache;

        let cache: LruCache<CompositeKey<(u64, &'static str)>, u64> =
            LruCache::try_new(4).unwrap();
        cache.put(CompositeKey::new((1, "norm")), 10);
        assert_eq!(cache.get(&CompositeKey::new((1, "norm"))), Some(10));
        assert_eq!(cache.get(&CompositeKey::new((2, "norm"))), None);
    }

    #[test]
    fn accessors_round_trip() {
        let key = CompositeKey::new((1u32, 2u32));
        assert_eq!(key.fields(), &(1, 2));
        assert_eq!(key.into_fields(), (1, 2));
        let from: CompositeKey<(u32,)> = (5u32,).into();
        assert_eq!(from.fields().0, 5);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = FxHasher::default();
        value.hash(&mut hasher);
        hasher.finish()
    }

    proptest! {
        /// Equal keys always hash identically.
        #[test]
        fn prop_eq_implies_hash_eq(a in any::<u64>(), b in any::<String>()) {
            let k1 = CompositeKey::new((a, b.clone()));
            let k2 = CompositeKey::new((a, b));
            prop_assert_eq!(&k1, &k2);
            prop_assert_eq!(hash_of(&k1), hash_of(&k2));
        }

        /// Folding is order-sensitive for distinct fields.
        #[test]
        fn prop_swapped_fields_differ(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a != b);
            let ab = CompositeKey::new((a, b));
            let ba = CompositeKey::new((b, a));
            prop_assert_ne!(ab, ba);
        }
    }
}
