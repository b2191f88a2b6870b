//! Similarity cache trait and types

use std::time::Duration;

use crate::domain::cache::CacheStats;
use crate::domain::DomainError;

use super::{Metadata, SimilarityEntry};

/// Result of a successful similarity lookup
#[derive(Debug, Clone)]
pub struct SimilarityMatch<V> {
    /// Snapshot of the matching entry (after the hit was recorded)
    pub entry: SimilarityEntry<V>,
    /// Similarity score that cleared the threshold
    pub similarity: f64,
}

impl<V> SimilarityMatch<V> {
    /// Create a new match
    pub fn new(entry: SimilarityEntry<V>, similarity: f64) -> Self {
        Self { entry, similarity }
    }
}

/// Approximate-match cache keyed by query closeness
pub trait SimilarityCache<V>: Send + Sync {
    /// Finds the single best live entry whose similarity to the query
    /// clears the configured threshold
    fn get_similar(
        &self,
        query: &str,
        query_vector: &[f64],
    ) -> Result<Option<SimilarityMatch<V>>, DomainError> {
        self.get_similar_filtered(query, query_vector, &|_| true)
    }

    /// Like `get_similar`, but only entries whose metadata satisfies
    /// `filter` take part in the scan
    fn get_similar_filtered(
        &self,
        query: &str,
        query_vector: &[f64],
        filter: &dyn Fn(&Metadata) -> bool,
    ) -> Result<Option<SimilarityMatch<V>>, DomainError>;

    /// Stores a response; returns the generated entry id
    fn set(
        &self,
        query: &str,
        query_vector: Vec<f64>,
        response: V,
        metadata: Metadata,
        ttl: Duration,
    ) -> Result<String, DomainError>;

    /// Removes an entry and its index references
    fn delete(&self, id: &str) -> Result<bool, DomainError>;

    /// Removes every entry and resets size and eviction counters
    fn clear(&self) -> Result<(), DomainError>;

    /// Removes all expired entries; returns how many were removed
    fn cleanup_expired(&self) -> Result<usize, DomainError>;

    /// Returns a snapshot of the cache counters
    fn stats(&self) -> Result<CacheStats, DomainError>;
}
