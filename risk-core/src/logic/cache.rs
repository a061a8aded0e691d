//! Response Cache
//!
//! Time- and capacity-bounded cache for upstream responses, keyed by
//! endpoint plus sorted parameters. Staleness is checked on read; when the
//! cache is full, expired entries go first, then the oldest tenth.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_DURATION_SECS};

struct CachedEntry<V> {
    value: V,
    cached_at: Instant,
}

pub struct ResponseCache<V> {
    entries: Mutex<HashMap<String, CachedEntry<V>>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// `endpoint?k1=v1&k2=v2` with parameters sorted by name
    pub fn key(endpoint: &str, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort();
        let query: Vec<String> = sorted.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}?{}", endpoint, query.join("&"))
    }

    /// Fresh value for `key`; a stale entry is dropped
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, value: V) {
        let mut entries = self.entries.lock();

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let ttl = self.ttl;
            entries.retain(|_, e| e.cached_at.elapsed() < ttl);
        }

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let mut by_age: Vec<(String, Instant)> =
                entries.iter().map(|(k, e)| (k.clone(), e.cached_at)).collect();
            by_age.sort_by_key(|(_, at)| *at);

            let evict = (self.capacity / 10).max(1);
            for (old, _) in by_age.into_iter().take(evict) {
                entries.remove(&old);
            }
            log::debug!("Response cache full, evicted {} oldest entries", evict);
        }

        entries.insert(key, CachedEntry { value, cached_at: Instant::now() });
    }

    /// Cached value, or the result of `fetch` (cached on success)
    pub fn get_or_fetch<E, F>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = fetch()?;
        self.insert(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// (entries, capacity)
    pub fn stats(&self) -> (usize, usize) {
        (self.len(), self.capacity)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CACHE_DURATION_SECS), DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_key_sorts_params() {
        let a = ResponseCache::<u32>::key("/feed", &[("start_date", "2024-01-01"), ("end_date", "2024-01-07")]);
        let b = ResponseCache::<u32>::key("/feed", &[("end_date", "2024-01-07"), ("start_date", "2024-01-01")]);
        assert_eq!(a, b);
        assert_eq!(a, "/feed?end_date=2024-01-07&start_date=2024-01-01");
    }

    #[test]
    fn test_hit_within_duration() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        let calls = Cell::new(0);
        let fetch = || -> Result<String, ()> {
            calls.set(calls.get() + 1);
            Ok(format!("response {}", calls.get()))
        };

        assert_eq!(cache.get_or_fetch("/neo/1", fetch).unwrap(), "response 1");
        assert_eq!(cache.get_or_fetch("/neo/1", fetch).unwrap(), "response 1");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_refetch_after_expiry() {
        let cache = ResponseCache::new(Duration::from_millis(30), 10);
        let calls = Cell::new(0);
        let fetch = || -> Result<u32, ()> {
            calls.set(calls.get() + 1);
            Ok(calls.get())
        };

        assert_eq!(cache.get_or_fetch("k", fetch), Ok(1));
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get_or_fetch("k", fetch), Ok(2));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failed_fetch_is_not_cached() {
        let cache = ResponseCache::<u32>::new(Duration::from_secs(60), 10);
        assert_eq!(cache.get_or_fetch("k", || Err("down")), Err("down"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicts_oldest_when_full() {
        let cache = ResponseCache::new(Duration::from_secs(60), 20);
        for i in 0..20 {
            cache.insert(format!("k{}", i), i);
            std::thread::sleep(Duration::from_millis(1));
        }
        cache.insert("new".to_string(), 99);

        assert_eq!(cache.len(), 19);
        assert_eq!(cache.get("k0"), None);
        assert_eq!(cache.get("k1"), None);
        assert_eq!(cache.get("k2"), Some(2));
        assert_eq!(cache.get("new"), Some(99));
    }
}
