// ==============================================
// METHOD REGISTRY TESTS (integration)
// ==============================================
//
// The registry through its public surface: create-once semantics on the
// process-global singleton, cross-handle visibility, and the memoization
// pattern the registry exists for: composite keys built from argument
// tuples against a named per-method cache.

use memokit::key::CompositeKey;
use memokit::registry::MethodCacheRegistry;

// Tests share one process-global registry, so every test uses its own
// (class, method) names.

#[test]
fn global_lookups_alias_one_cache() {
    let registry = MethodCacheRegistry::global();

    let a = registry
        .method_cache::<u64, u64>("RegistryTest", "alias", 16)
        .unwrap();
    let b = registry
        .method_cache::<u64, u64>("RegistryTest", "alias", 64)
        .unwrap();

    a.put(1, 10);
    assert_eq!(b.get(&1), Some(10));
    assert_eq!(b.capacity(), 16); // the first sizing won
}

#[test]
fn key_and_value_types_partition_the_namespace() {
    let registry = MethodCacheRegistry::global();

    let by_id = registry
        .method_cache::<u64, String>("RegistryTest", "typed", 8)
        .unwrap();
    let by_name = registry
        .method_cache::<String, String>("RegistryTest", "typed", 8)
        .unwrap();

    by_id.put(1, "one".to_string());
    assert_eq!(by_name.get(&"1".to_string()), None);
    assert_eq!(by_id.get(&1), Some("one".to_string()));
}

#[test]
fn sharded_lookup_is_create_once_too() {
    let registry = MethodCacheRegistry::global();

    let a = registry
        .sharded_method_cache::<u64, u64>("RegistryTest", "sharded", 4, 64)
        .unwrap();
    let b = registry
        .sharded_method_cache::<u64, u64>("RegistryTest", "sharded", 16, 1024)
        .unwrap();

    a.put(9, 81);
    assert_eq!(b.get(&9), Some(81));
    assert_eq!(b.shard_count(), 4);
    assert_eq!(b.capacity(), 64);
}

// ==============================================
// The memoization pattern
// ==============================================

/// A deliberately expensive computation with call counting.
fn norm_squared(fields: &[u64], calls: &std::cell::Cell<usize>) -> u64 {
    calls.set(calls.get() + 1);
    fields.iter().map(|f| f * f).sum()
}

#[test]
fn memoized_call_site_computes_once_per_argument_tuple() {
    let registry = MethodCacheRegistry::global();
    let cache = registry
        .method_cache::<CompositeKey<(u64, u64, u64)>, u64>("RegistryTest", "norm_squared", 32)
        .unwrap();

    let calls = std::cell::Cell::new(0usize);
    let memoized = |x: u64, y: u64, z: u64| -> u64 {
        let key = CompositeKey::new((x, y, z));
        if let Some(hit) = cache.get(&key) {
            return hit;
        }
        let value = norm_squared(&[x, y, z], &calls);
        cache.put(key, value);
        value
    };

    assert_eq!(memoized(1, 2, 3), 14);
    assert_eq!(memoized(1, 2, 3), 14);
    assert_eq!(memoized(1, 2, 3), 14);
    assert_eq!(calls.get(), 1);

    // A different argument tuple misses and recomputes
    assert_eq!(memoized(3, 2, 1), 14);
    assert_eq!(calls.get(), 2);
}
