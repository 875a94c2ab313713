//! # Method Cache Registry
//!
//! A process-wide, type-erased map from `(class, method, key type, value
//! type)` quadruples to lazily created cache instances. Call sites memoizing
//! a method obtain "their" cache by name and type; the first caller to ask
//! for a quadruple creates the cache, everyone after gets the same handle.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │                   MethodCacheRegistry (global)                  │
//!   │                                                                 │
//!   │   RwLock<FxHashMap<RegistryKey, Arc<dyn Any + Send + Sync>>>    │
//!   │                                                                 │
//!   │   RegistryKey {                                                 │
//!   │       class:      "Vector",                                     │
//!   │       method:     "norm",                                       │
//!   │       key_type:   TypeId::of::<u64>(),                          │
//!   │       value_type: TypeId::of::<f64>(),                          │
//!   │   }  ──►  Arc<MethodCache<u64, f64>>  (erased)                  │
//!   └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lookup is double-checked: a shared-lock fast path for the common "entry
//! exists" case, then an exclusive re-check-then-create for first use. The
//! first successful creation for a quadruple wins and the entry persists for
//! the life of the process. The `Arc<dyn Any>` handle carries the concrete
//! destructor in its vtable, so erasure never leaks a type's drop glue.
//!
//! ## Example Usage
//!
//! ```
//! use memokit::registry::MethodCacheRegistry;
//!
//! let registry = MethodCacheRegistry::global();
//!
//! let cache = registry
//!     .method_cache::<u64, f64>("Vector", "norm", 128)
//!     .unwrap();
//! cache.put(7, 3.5);
//!
//! // A second lookup observes the same underlying cache
//! let again = registry
//!     .method_cache::<u64, f64>("Vector", "norm", 64)
//!     .unwrap();
//! assert_eq!(again.get(&7), Some(3.5));
//! ```

use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cache::PolicyCache;
use crate::error::ConfigError;
use crate::key::{fold, hash_field};
use crate::policy::{EvictionPolicy, LruPolicy};
use crate::sharded::ShardedCache;
use crate::sync::Shared;

/// Cache variant the registry creates for plain lookups (LRU by default,
/// like a registry entry that names no policy).
pub type MethodCache<K, V> = PolicyCache<K, V, LruPolicy<K>, Shared>;

/// Cache variant the registry creates for sharded lookups.
pub type ShardedMethodCache<K, V> = ShardedCache<K, V, LruPolicy<K>, Shared, Shared>;

/// Structural key of a registry entry: class name, method name, and the
/// static types of the cache's key and value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RegistryKey {
    class: String,
    method: String,
    key_type: TypeId,
    value_type: TypeId,
}

impl Hash for RegistryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut acc = fold(0, hash_field(self.class.as_str()));
        acc = fold(acc, hash_field(self.method.as_str()));
        acc = fold(acc, hash_field(&self.key_type));
        acc = fold(acc, hash_field(&self.value_type));
        state.write_u64(acc);
    }
}

static GLOBAL: OnceLock<MethodCacheRegistry> = OnceLock::new();

/// Process-wide registry of per-method caches.
///
/// [`MethodCacheRegistry::global`] returns the singleton most callers want;
/// separate instances exist only so tests can run in isolation.
#[derive(Default)]
pub struct MethodCacheRegistry {
    entries: RwLock<FxHashMap<RegistryKey, Arc<dyn Any + Send + Sync>>>,
}

impl std::fmt::Debug for MethodCacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodCacheRegistry")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl MethodCacheRegistry {
    /// Creates an empty, private registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-global registry, created on first access.
    pub fn global() -> &'static MethodCacheRegistry {
        GLOBAL.get_or_init(MethodCacheRegistry::new)
    }

    /// Returns the cache for `(class, method, K, V)`, creating an LRU cache
    /// of `capacity` entries on first use.
    ///
    /// `capacity` only matters to whichever caller arrives first; the
    /// created instance is returned as-is to everyone after. Fails if the
    /// quadruple was first created as a different cache variant.
    pub fn method_cache<K, V>(
        &self,
        class: &str,
        method: &str,
        capacity: usize,
    ) -> Result<Arc<MethodCache<K, V>>, ConfigError>
    where
        K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.lookup_or_create::<K, V, MethodCache<K, V>>(class, method, || {
            MethodCache::try_new(capacity)
        })
    }

    /// Like [`method_cache`](Self::method_cache), but with an explicit
    /// eviction policy type instead of the LRU default.
    pub fn method_cache_with_policy<K, V, P>(
        &self,
        class: &str,
        method: &str,
        capacity: usize,
    ) -> Result<Arc<PolicyCache<K, V, P, Shared>>, ConfigError>
    where
        K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        P: EvictionPolicy<K> + Default + Send + Sync + 'static,
    {
        self.lookup_or_create::<K, V, PolicyCache<K, V, P, Shared>>(class, method, || {
            PolicyCache::try_new(capacity)
        })
    }

    /// Returns the sharded cache for `(class, method, K, V)`, creating one
    /// with `shards` partitions over `capacity` total entries on first use.
    pub fn sharded_method_cache<K, V>(
        &self,
        class: &str,
        method: &str,
        shards: usize,
        capacity: usize,
    ) -> Result<Arc<ShardedMethodCache<K, V>>, ConfigError>
    where
        K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.lookup_or_create::<K, V, ShardedMethodCache<K, V>>(class, method, || {
            ShardedMethodCache::try_new(shards, capacity)
        })
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup_or_create<K, V, C>(
        &self,
        class: &str,
        method: &str,
        create: impl FnOnce() -> Result<C, ConfigError>,
    ) -> Result<Arc<C>, ConfigError>
    where
        K: 'static,
        V: 'static,
        C: Send + Sync + 'static,
    {
        let key = RegistryKey {
            class: class.to_string(),
            method: method.to_string(),
            key_type: TypeId::of::<K>(),
            value_type: TypeId::of::<V>(),
        };

        // Fast path: the entry almost always exists already.
        if let Some(handle) = self.entries.read().get(&key) {
            return downcast_handle(handle.clone(), class, method);
        }

        let mut entries = self.entries.write();
        // Somebody else may have created it between the two acquisitions.
        if let Some(handle) = entries.get(&key) {
            return downcast_handle(handle.clone(), class, method);
        }

        let cache = Arc::new(create()?);
        debug!(class, method, "created method cache");
        entries.insert(key, cache.clone() as Arc<dyn Any + Send + Sync>);
        Ok(cache)
    }
}

fn downcast_handle<C: Send + Sync + 'static>(
    handle: Arc<dyn Any + Send + Sync>,
    class: &str,
    method: &str,
) -> Result<Arc<C>, ConfigError> {
    handle.downcast::<C>().map_err(|_| {
        ConfigError::new(format!(
            "method cache {class}::{method} was created as a different cache variant"
        ))
    })
}
