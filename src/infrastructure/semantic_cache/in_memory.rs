//! In-memory similarity cache implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::domain::cache::CacheStats;
use crate::domain::semantic_cache::{
    query_similarity, Metadata, SemanticCacheConfig, SimilarityCache, SimilarityEntry,
    SimilarityMatch,
};
use crate::domain::traits::Sweep;
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_cache_lookup, record_eviction, record_sweep, CacheOutcome,
};

use super::index::InvertedIndex;

const CACHE_NAME: &str = "similarity";

/// Entries and the token index, guarded together
#[derive(Debug)]
struct Store<V> {
    entries: HashMap<String, SimilarityEntry<V>>,
    index: InvertedIndex,
}

impl<V> Store<V> {
    fn remove(&mut self, id: &str) -> Option<SimilarityEntry<V>> {
        let entry = self.entries.remove(id)?;
        self.index.remove(id, entry.query());
        Some(entry)
    }
}

/// In-memory similarity cache
///
/// Candidates come from an inverted index over the query tokens, so a
/// lookup only scores entries that share at least one indexed word with
/// the query.
#[derive(Debug)]
pub struct InMemorySimilarityCache<V> {
    store: RwLock<Store<V>>,
    config: SemanticCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<V> InMemorySimilarityCache<V>
where
    V: Clone + Send + Sync,
{
    /// Create a new similarity cache with default configuration
    pub fn new() -> Self {
        Self::build(SemanticCacheConfig::default())
    }

    /// Create a new similarity cache with the given configuration
    pub fn with_config(config: SemanticCacheConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SemanticCacheConfig) -> Self {
        Self {
            store: RwLock::new(Store {
                entries: HashMap::new(),
                index: InvertedIndex::new(),
            }),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    /// Evict the least recently used entry if the cache is full
    fn evict_if_needed(&self, store: &mut Store<V>) {
        if store.entries.len() < self.config.max_entries {
            return;
        }

        let oldest_id = store
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access())
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest_id {
            store.remove(&id);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            record_eviction(CACHE_NAME);
            tracing::debug!(id = %id, "Evicted least recently used similarity entry");
        }
    }
}

impl<V> Default for InMemorySimilarityCache<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SimilarityCache<V> for InMemorySimilarityCache<V>
where
    V: Clone + Send + Sync,
{
    fn get_similar_filtered(
        &self,
        query: &str,
        query_vector: &[f64],
        filter: &dyn Fn(&Metadata) -> bool,
    ) -> Result<Option<SimilarityMatch<V>>, DomainError> {
        DomainError::require_non_empty("query", query)?;

        let mut store = self.store.write().map_err(DomainError::poisoned)?;
        let now = Instant::now();
        let threshold = self.config.similarity_threshold;

        let mut best: Option<(String, f64)> = None;
        let mut best_similarity = 0.0;
        let mut expired = Vec::new();

        for id in store.index.candidates(query) {
            let Some(entry) = store.entries.get(&id) else {
                continue;
            };

            if entry.is_expired_at(now) {
                expired.push(id);
                continue;
            }

            if !filter(entry.metadata()) {
                continue;
            }

            let similarity =
                query_similarity(query, query_vector, entry.query(), entry.query_vector());

            if similarity >= threshold && similarity > best_similarity {
                best_similarity = similarity;
                best = Some((id, similarity));
            }
        }

        for id in &expired {
            store.remove(id);
        }

        let found = best.and_then(|(id, similarity)| {
            store.entries.get_mut(&id).map(|entry| {
                entry.touch(now);
                SimilarityMatch::new(entry.clone(), similarity)
            })
        });

        match found {
            Some(hit) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                record_cache_lookup(CACHE_NAME, CacheOutcome::Hit);
                Ok(Some(hit))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                record_cache_lookup(CACHE_NAME, CacheOutcome::Miss);
                Ok(None)
            }
        }
    }

    fn set(
        &self,
        query: &str,
        query_vector: Vec<f64>,
        response: V,
        metadata: Metadata,
        ttl: Duration,
    ) -> Result<String, DomainError> {
        DomainError::require_non_empty("query", query)?;

        let ttl = if ttl.is_zero() {
            self.config.default_ttl()
        } else {
            ttl
        };

        let mut store = self.store.write().map_err(DomainError::poisoned)?;
        self.evict_if_needed(&mut store);

        let id = Uuid::new_v4().to_string();
        let entry = SimilarityEntry::new(&id, query, query_vector, response, ttl, Instant::now())
            .with_metadata(metadata);

        store.index.insert(&id, query);
        store.entries.insert(id.clone(), entry);

        Ok(id)
    }

    fn delete(&self, id: &str) -> Result<bool, DomainError> {
        DomainError::require_non_empty("id", id)?;

        let mut store = self.store.write().map_err(DomainError::poisoned)?;
        Ok(store.remove(id).is_some())
    }

    fn clear(&self) -> Result<(), DomainError> {
        let mut store = self.store.write().map_err(DomainError::poisoned)?;

        store.entries.clear();
        store.index.clear();
        self.evictions.store(0, Ordering::Relaxed);

        Ok(())
    }

    fn cleanup_expired(&self) -> Result<usize, DomainError> {
        let mut store = self.store.write().map_err(DomainError::poisoned)?;
        let now = Instant::now();

        let expired: Vec<String> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            store.remove(id);
        }

        if !expired.is_empty() {
            tracing::debug!(removed = expired.len(), "Removed expired similarity entries");
        }

        Ok(expired.len())
    }

    fn stats(&self) -> Result<CacheStats, DomainError> {
        let store = self.store.read().map_err(DomainError::poisoned)?;

        Ok(CacheStats::new(
            store.entries.len(),
            self.config.max_entries,
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.evictions.load(Ordering::Relaxed),
        ))
    }
}

impl<V> Sweep for InMemorySimilarityCache<V>
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
