//! Similarity cache entry

use std::time::{Duration, Instant};

use serde_json::{Map, Value};

/// Free-form metadata attached to a cached response
pub type Metadata = Map<String, Value>;

/// A cached response keyed by the natural-language query that produced it
#[derive(Debug, Clone)]
pub struct SimilarityEntry<V> {
    /// Unique identifier for this entry
    id: String,
    /// The original query text
    query: String,
    /// Optional query embedding; empty means lexical matching only
    query_vector: Vec<f64>,
    /// The cached response
    response: V,
    /// Additional metadata
    metadata: Metadata,
    created_at: Instant,
    expires_at: Instant,
    last_access: Instant,
    access_count: u64,
    /// Fixed at 1.0 on insert
    confidence: f64,
}

impl<V> SimilarityEntry<V> {
    /// Create a new entry expiring `ttl` after `now`
    pub fn new(
        id: impl Into<String>,
        query: impl Into<String>,
        query_vector: Vec<f64>,
        response: V,
        ttl: Duration,
        now: Instant,
    ) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            query_vector,
            response,
            metadata: Metadata::new(),
            created_at: now,
            expires_at: now + ttl,
            last_access: now,
            access_count: 0,
            confidence: 1.0,
        }
    }

    /// Set metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_vector(&self) -> &[f64] {
        &self.query_vector
    }

    pub fn response(&self) -> &V {
        &self.response
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn last_access(&self) -> Instant {
        self.last_access
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Check if entry is expired
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Records a hit
    pub fn touch(&mut self, now: Instant) {
        self.access_count += 1;
        self.last_access = now;
    }
}
