//! Lookup cache with a fixed per-instance time-to-live.
//!
//! Expiry is checked lazily on read; there is no background sweep. A stale
//! entry found by `get` is evicted as a side effect.

use std::collections::HashMap;
use std::hash::Hash;

use crate::types::Millis;

#[derive(Debug, Clone, PartialEq)]
struct CacheEntry<V> {
    value: V,
    expires_at: Millis,
}

#[derive(Debug, Clone)]
pub struct ExpiringCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl_ms: Millis,
}

impl<K: Eq + Hash, V: Clone> ExpiringCache<K, V> {
    pub fn new(ttl_ms: Millis) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms,
        }
    }

    pub fn ttl_ms(&self) -> Millis {
        self.ttl_ms
    }

    pub fn set(&mut self, key: K, value: V, now: Millis) {
        let expires_at = now.saturating_add(self.ttl_ms);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Returns the cached value if it has not expired yet.
    pub fn get(&mut self, key: &K, now: Millis) -> Option<V> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now > entry.expires_at,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Returns the cached value, or computes, stores and returns a fresh one.
    ///
    /// `None` from `load` is returned as-is and not cached.
    pub fn get_or_load<F, E>(&mut self, key: K, now: Millis, load: F) -> Result<Option<V>, E>
    where
        K: Clone,
        F: FnOnce() -> Result<Option<V>, E>,
    {
        if let Some(value) = self.get(&key, now) {
            return Ok(Some(value));
        }
        let loaded = load()?;
        if let Some(value) = loaded.as_ref() {
            self.set(key, value.clone(), now);
        }
        Ok(loaded)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Clears the whole cache once it holds more than `max_entries`.
    ///
    /// Returns true if the cache was cleared.
    pub fn clear_if_over(&mut self, max_entries: usize) -> bool {
        if self.entries.len() > max_entries {
            self.entries.clear();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_before_ttl_returns_last_set_value() {
        let mut cache = ExpiringCache::new(200);
        cache.set("a", 1, 1_000);
        cache.set("a", 2, 1_050);
        assert_eq!(cache.get(&"a", 1_100), Some(2));
        assert_eq!(cache.get(&"a", 1_250), Some(2));
    }

    #[test]
    fn get_after_ttl_evicts_entry() {
        let mut cache = ExpiringCache::new(40);
        cache.set((1, 2, 3), "lava".to_string(), 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&(1, 2, 3), 41), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn missing_key_is_absent_not_error() {
        let mut cache: ExpiringCache<&str, u8> = ExpiringCache::new(10);
        assert_eq!(cache.get(&"nothing", 0), None);
    }

    #[test]
    fn clear_empties_all_entries() {
        let mut cache = ExpiringCache::new(1_000);
        for key in 0..10 {
            cache.set(key, key * 2, 0);
        }
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(&3, 1), None);
    }

    #[test]
    fn clear_if_over_respects_ceiling() {
        let mut cache = ExpiringCache::new(1_000);
        for key in 0..5 {
            cache.set(key, (), 0);
        }
        assert!(!cache.clear_if_over(5));
        assert_eq!(cache.len(), 5);
        cache.set(5, (), 0);
        assert!(cache.clear_if_over(5));
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_load_caches_present_values_only() {
        let mut cache = ExpiringCache::new(100);
        let mut calls = 0;
        let first: Result<Option<&str>, ()> = cache.get_or_load("k", 0, || {
            calls += 1;
            Ok(Some("stone"))
        });
        assert_eq!(first, Ok(Some("stone")));
        let second: Result<Option<&str>, ()> = cache.get_or_load("k", 50, || {
            calls += 1;
            Ok(Some("other"))
        });
        assert_eq!(second, Ok(Some("stone")));
        assert_eq!(calls, 1);

        let absent: Result<Option<&str>, ()> = cache.get_or_load("air", 0, || Ok(None));
        assert_eq!(absent, Ok(None));
        assert_eq!(cache.len(), 1);
    }
}
