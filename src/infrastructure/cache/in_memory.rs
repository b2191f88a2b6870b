//! In-memory exact cache implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::domain::cache::{CacheEntry, CacheStats, ExactCache, ExactCacheConfig};
use crate::domain::traits::Sweep;
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_cache_lookup, record_eviction, record_sweep, CacheOutcome,
};

const CACHE_NAME: &str = "exact";

/// In-memory exact cache with TTL expiry and LRU eviction
///
/// Eviction scans for the oldest `last_access`, so inserts into a full
/// cache are O(n).
#[derive(Debug)]
pub struct InMemoryExactCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    config: ExactCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V> InMemoryExactCache<V>
where
    V: Clone + Send + Sync,
{
    /// Creates a new cache with default configuration
    pub fn new() -> Self {
        Self::build(ExactCacheConfig::default())
    }

    /// Creates a new cache with the given configuration
    pub fn with_config(config: ExactCacheConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ExactCacheConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ExactCacheConfig {
        &self.config
    }

    fn effective_ttl(&self, ttl: Duration) -> Duration {
        if ttl.is_zero() {
            self.config.default_ttl()
        } else {
            ttl
        }
    }

    /// Removes the least recently used entry
    fn evict_lru(&self, entries: &mut HashMap<String, CacheEntry<V>>) {
        let oldest_key = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access())
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest_key {
            entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            record_eviction(CACHE_NAME);
            tracing::debug!(key = %key, "Evicted least recently used cache entry");
        }
    }

    fn record_miss(&self, outcome: CacheOutcome) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        record_cache_lookup(CACHE_NAME, outcome);
    }
}

impl<V> Default for InMemoryExactCache<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ExactCache<V> for InMemoryExactCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Result<Option<V>, DomainError> {
        DomainError::require_non_empty("key", key)?;

        let mut entries = self.entries.write().map_err(DomainError::poisoned)?;
        let now = Instant::now();

        match entries.get_mut(key) {
            None => {
                self.record_miss(CacheOutcome::Miss);
                return Ok(None);
            }
            Some(entry) if !entry.is_expired_at(now) => {
                entry.touch(now);
                self.hits.fetch_add(1, Ordering::Relaxed);
                record_cache_lookup(CACHE_NAME, CacheOutcome::Hit);
                return Ok(Some(entry.value().clone()));
            }
            Some(_) => {}
        }

        entries.remove(key);
        self.record_miss(CacheOutcome::Expired);

        Ok(None)
    }

    fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), DomainError> {
        DomainError::require_non_empty("key", key)?;

        let ttl = self.effective_ttl(ttl);
        let mut entries = self.entries.write().map_err(DomainError::poisoned)?;

        if !entries.contains_key(key) && entries.len() >= self.config.max_entries {
            self.evict_lru(&mut entries);
        }

        entries.insert(
            key.to_string(),
            CacheEntry::new(key, value, ttl, Instant::now()),
        );

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, DomainError> {
        DomainError::require_non_empty("key", key)?;

        let mut entries = self.entries.write().map_err(DomainError::poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(DomainError::poisoned)?;

        entries.clear();
        self.evictions.store(0, Ordering::Relaxed);

        Ok(())
    }

    fn cleanup_expired(&self) -> Result<usize, DomainError> {
        let mut entries = self.entries.write().map_err(DomainError::poisoned)?;
        let now = Instant::now();

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - entries.len();

        if removed > 0 {
            tracing::debug!(removed, "Removed expired cache entries");
        }

        Ok(removed)
    }

    fn stats(&self) -> Result<CacheStats, DomainError> {
        let entries = self.entries.read().map_err(DomainError::poisoned)?;

        Ok(CacheStats::new(
            entries.len(),
            self.config.max_entries,
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.evictions.load(Ordering::Relaxed),
        ))
    }
}

impl<V> Sweep for InMemoryExactCache<V>
where
    V: Clone + Send + Sync,
{
    fn sweep_name(&self) -> &'static str {
        CACHE_NAME
    }

    fn sweep(&self) -> Result<usize, DomainError> {
        let removed = self.cleanup_expired()?;
        record_sweep(CACHE_NAME, removed);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn small_cache(max_entries: usize) -> InMemoryExactCache<String> {
        InMemoryExactCache::with_config(ExactCacheConfig::new().with_max_entries(max_entries))
            .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let cache = InMemoryExactCache::new();

        cache
            .set("key1", "value1".to_string(), Duration::from_secs(60))
            .unwrap();

        assert_eq!(cache.get("key1").unwrap(), Some("value1".to_string()));
    }

    #[test]
    fn test_get_nonexistent() {
        let cache: InMemoryExactCache<String> = InMemoryExactCache::new();

        assert_eq!(cache.get("missing").unwrap(), None);

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_misses, 1);
        assert_eq!(stats.total_hits, 0);
    }

    #[test]
    fn test_overwrite_existing_key() {
        let cache = small_cache(1);

        cache.set("k", "a".to_string(), Duration::ZERO).unwrap();
        cache.set("k", "b".to_string(), Duration::ZERO).unwrap();

        assert_eq!(cache.get("k").unwrap(), Some("b".to_string()));
        assert_eq!(cache.stats().unwrap().evictions, 0);
    }

    #[test]
    fn test_empty_key_rejected() {
        let cache: InMemoryExactCache<String> = InMemoryExactCache::new();

        assert!(matches!(
            cache.get(""),
            Err(DomainError::Validation { .. })
        ));
        assert!(cache.set("", "v".to_string(), Duration::ZERO).is_err());
        assert!(matches!(
            cache.delete(""),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result: Result<InMemoryExactCache<String>, _> =
            InMemoryExactCache::with_config(ExactCacheConfig::new().with_max_entries(0));

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_expiry() {
        let cache = InMemoryExactCache::new();

        cache
            .set("q1", vec![1u8, 2, 3], Duration::from_millis(100))
            .unwrap();
        assert_eq!(cache.get("q1").unwrap(), Some(vec![1u8, 2, 3]));

        thread::sleep(Duration::from_millis(150));

        assert_eq!(cache.get("q1").unwrap(), None);
        assert_eq!(cache.stats().unwrap().size, 0);
    }

    #[test]
    fn test_cleanup_expired_removes_physically() {
        let cache = InMemoryExactCache::new();

        cache
            .set("short", "v".to_string(), Duration::from_millis(50))
            .unwrap();
        cache
            .set("long", "v".to_string(), Duration::from_secs(60))
            .unwrap();

        thread::sleep(Duration::from_millis(80));

        assert_eq!(cache.cleanup_expired().unwrap(), 1);
        assert_eq!(cache.stats().unwrap().size, 1);
        assert_eq!(cache.sweep().unwrap(), 0);
    }

    #[test]
    fn test_lru_eviction_removes_oldest_access() {
        let cache = small_cache(3);

        cache.set("a", "1".to_string(), Duration::ZERO).unwrap();
        thread::sleep(Duration::from_millis(2));
        cache.set("b", "2".to_string(), Duration::ZERO).unwrap();
        thread::sleep(Duration::from_millis(2));
        cache.set("c", "3".to_string(), Duration::ZERO).unwrap();
        thread::sleep(Duration::from_millis(2));

        // Touch "a" so "b" becomes least recently used
        assert!(cache.get("a").unwrap().is_some());
        thread::sleep(Duration::from_millis(2));

        cache.set("d", "4".to_string(), Duration::ZERO).unwrap();

        assert!(cache.get("b").unwrap().is_none());
        assert!(cache.get("a").unwrap().is_some());
        assert!(cache.get("c").unwrap().is_some());
        assert!(cache.get("d").unwrap().is_some());

        let stats = cache.stats().unwrap();
        assert_eq!(stats.size, 3);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn test_delete() {
        let cache = InMemoryExactCache::new();

        cache.set("k", 1u32, Duration::ZERO).unwrap();

        assert!(cache.delete("k").unwrap());
        assert!(!cache.delete("k").unwrap());
        assert_eq!(cache.get("k").unwrap(), None);
    }

    #[test]
    fn test_clear_keeps_hit_counters() {
        let cache = small_cache(1);

        cache.set("a", "1".to_string(), Duration::ZERO).unwrap();
        cache.set("b", "2".to_string(), Duration::ZERO).unwrap();
        cache.get("b").unwrap();
        cache.get("a").unwrap();

        cache.clear().unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.total_hits, 1);
        assert_eq!(stats.total_misses, 1);
    }

    #[test]
    fn test_stats_hit_rate() {
        let cache = InMemoryExactCache::new();

        cache.set("k", 1u32, Duration::ZERO).unwrap();
        cache.get("k").unwrap();
        cache.get("k").unwrap();
        cache.get("k").unwrap();
        cache.get("other").unwrap();

        let stats = cache.stats().unwrap();
        assert_eq!(stats.max_size, 10_000);
        assert!((stats.hit_rate - 0.75).abs() < 1e-9);
        assert!((stats.miss_rate - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_access_keeps_counts() {
        let cache = Arc::new(InMemoryExactCache::new());
        cache.set("shared", 7u32, Duration::ZERO).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..100 {
                        cache.get("shared").unwrap();
                        cache
                            .set(&format!("k-{}-{}", i, j), j, Duration::ZERO)
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats().unwrap();
        assert_eq!(stats.total_hits, 800);
        assert_eq!(stats.size, 801);
    }
}
