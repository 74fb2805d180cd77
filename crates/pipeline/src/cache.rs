//! Process-wide memoisation keyed by input identity.
//!
//! Each distinct key is computed at most once: the lock is held while a
//! missing value is built, so concurrent callers for the same key wait and
//! then share the result. Values are immutable and handed out as `Arc`s.
//! Entries only leave through `retain` (callers drop keys that went stale)
//! or `clear`, the manual invalidation hook.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Hit/miss counters of a `MemoCache`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub struct MemoCache<K, V> {
    name: &'static str,
    entries: Mutex<HashMap<K, Arc<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Debug,
{
    /// Create an empty cache. `name` only shows up in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, building it with `init` on a miss.
    ///
    /// A failed `init` caches nothing; the next call tries again.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut entries = self.lock();
        if let Some(value) = entries.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(cache = self.name, ?key, "cache hit");
            return Ok(Arc::clone(value));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(cache = self.name, ?key, "cache miss");
        let value = Arc::new(init()?);
        entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    /// Infallible variant of `get_or_try_insert_with`
    pub fn get_or_insert_with<F>(&self, key: K, init: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match self.get_or_try_insert_with(key, || Ok::<V, std::convert::Infallible>(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Keep only the entries whose key satisfies `keep`
    pub fn retain<F>(&self, mut keep: F)
    where
        F: FnMut(&K) -> bool,
    {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| keep(key));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(cache = self.name, evicted, "evicted stale entries");
        }
    }

    /// Drop every cached value
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    // Values are immutable Arcs, so a poisoned map is still consistent
    fn lock(&self) -> MutexGuard<'_, HashMap<K, Arc<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_computes_once_per_key() {
        let cache: MemoCache<&str, usize> = MemoCache::new("test");
        let calls = Cell::new(0);

        let a = cache.get_or_insert_with("a", || {
            calls.set(calls.get() + 1);
            1
        });
        let again = cache.get_or_insert_with("a", || {
            calls.set(calls.get() + 1);
            2
        });

        assert_eq!(*a, 1);
        assert!(Arc::ptr_eq(&a, &again));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_distinct_keys() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test");
        cache.get_or_insert_with(1, || 10);
        cache.get_or_insert_with(2, || 20);

        assert_eq!(cache.len(), 2);
        assert_eq!(*cache.get_or_insert_with(2, || 0), 20);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test");

        let failed: Result<Arc<u32>, &str> = cache.get_or_try_insert_with(1, || Err("boom"));
        assert!(failed.is_err());
        assert!(cache.is_empty());

        let ok: Result<Arc<u32>, &str> = cache.get_or_try_insert_with(1, || Ok(7));
        assert_eq!(*ok.unwrap(), 7);
    }

    #[test]
    fn test_retain_drops_rejected_keys() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test");
        for key in 1..=4 {
            cache.get_or_insert_with(key, || key * 10);
        }

        cache.retain(|key| key % 2 == 0);

        assert_eq!(cache.len(), 2);
        assert_eq!(*cache.get_or_insert_with(2, || 0), 20);
        assert_eq!(*cache.get_or_insert_with(1, || 0), 0);
    }

    #[test]
    fn test_clear_invalidates() {
        let cache: MemoCache<u32, u32> = MemoCache::new("test");
        cache.get_or_insert_with(1, || 1);
        cache.clear();

        assert_eq!(*cache.get_or_insert_with(1, || 2), 2);
        assert_eq!(cache.stats().misses, 2);
    }
}
