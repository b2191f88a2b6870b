//! Inference caching service
//!
//! Wires the exact cache, the similarity cache and the burst-aware limiter
//! into the lookup-before-call / admit-before-call flow used in front of an
//! expensive backend.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::cache::{CacheKeyGenerator, CacheKeyParams, ExactCache, Sha256KeyGenerator};
use crate::domain::embedding::Embedder;
use crate::domain::rate_limit::{BurstAdmissionLimiter, RateLimitConfig};
use crate::domain::semantic_cache::{Metadata, SimilarityCache};
use crate::domain::DomainError;

const KEY_PREFIX: &str = "inference";
const MODEL_METADATA: &str = "model";

/// A cached response and where it came from
#[derive(Debug, Clone, PartialEq)]
pub enum CacheHit<V> {
    Exact(V),
    Similar { value: V, similarity: f64 },
}

impl<V> CacheHit<V> {
    pub fn value(&self) -> &V {
        match self {
            Self::Exact(value) | Self::Similar { value, .. } => value,
        }
    }
}

/// Result of running a request through the service
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<V> {
    /// Served from the exact cache
    Exact(V),
    /// Served from the similarity cache
    Similar { value: V, similarity: f64 },
    /// The backend ran and its response was cached
    Computed(V),
    /// The limiter refused; the backend was not called
    Throttled,
}

impl<V> From<CacheHit<V>> for Outcome<V> {
    fn from(hit: CacheHit<V>) -> Self {
        match hit {
            CacheHit::Exact(value) => Self::Exact(value),
            CacheHit::Similar { value, similarity } => Self::Similar { value, similarity },
        }
    }
}

/// Caches backend responses per model and throttles callers
pub struct InferenceCacheService<V> {
    exact: Arc<dyn ExactCache<V>>,
    similar: Arc<dyn SimilarityCache<V>>,
    limiter: Arc<dyn BurstAdmissionLimiter>,
    embedder: Option<Arc<dyn Embedder>>,
    key_generator: Sha256KeyGenerator,
    limits: RateLimitConfig,
}

impl<V> InferenceCacheService<V>
where
    V: Clone + Send + Sync,
{
    /// Create a service with lexical similarity matching only
    pub fn new(
        exact: Arc<dyn ExactCache<V>>,
        similar: Arc<dyn SimilarityCache<V>>,
        limiter: Arc<dyn BurstAdmissionLimiter>,
        limits: RateLimitConfig,
    ) -> Self {
        Self {
            exact,
            similar,
            limiter,
            embedder: None,
            key_generator: Sha256KeyGenerator::new(),
            limits,
        }
    }

    /// Use `embedder` to produce query vectors
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Exact-cache key for a model and query
    pub fn cache_key(&self, model: &str, query: &str) -> String {
        self.key_generator
            .generate(&CacheKeyParams::new(KEY_PREFIX).with_param(model).with_param(query))
    }

    /// Query vector, or empty for lexical matching
    fn query_vector(&self, query: &str) -> Vec<f64> {
        let Some(embedder) = &self.embedder else {
            return Vec::new();
        };

        match embedder.embed(query) {
            Ok(vector) => vector,
            Err(e) => {
                warn!(embedder = embedder.name(), "Failed to embed query: {}", e);
                Vec::new()
            }
        }
    }

    /// Looks up the exact cache, then the similarity cache
    ///
    /// Only similar entries stored for the same model are considered.
    pub fn lookup(&self, model: &str, query: &str) -> Result<Option<CacheHit<V>>, DomainError> {
        DomainError::require_non_empty("model", model)?;
        DomainError::require_non_empty("query", query)?;

        if let Some(value) = self.exact.get(&self.cache_key(model, query))? {
            debug!(model = %model, "Exact cache hit");
            return Ok(Some(CacheHit::Exact(value)));
        }

        let vector = self.query_vector(query);
        let same_model = |metadata: &Metadata| {
            metadata.get(MODEL_METADATA).and_then(Value::as_str) == Some(model)
        };
        let Some(found) = self
            .similar
            .get_similar_filtered(query, &vector, &same_model)?
        else {
            return Ok(None);
        };

        debug!(
            "Similarity cache hit with similarity {:.4} for entry {}",
            found.similarity,
            found.entry.id()
        );

        Ok(Some(CacheHit::Similar {
            value: found.entry.response().clone(),
            similarity: found.similarity,
        }))
    }

    /// Asks the burst-aware limiter whether `identifier` may call the backend
    pub fn admit(&self, identifier: &str) -> Result<bool, DomainError> {
        self.limiter.allow_with_burst(
            identifier,
            self.limits.requests_per_minute,
            self.limits.burst_limit,
        )
    }

    /// Stores a backend response in both caches with their default TTLs
    pub fn store(&self, model: &str, query: &str, value: V) -> Result<(), DomainError> {
        DomainError::require_non_empty("model", model)?;
        DomainError::require_non_empty("query", query)?;

        self.exact
            .set(&self.cache_key(model, query), value.clone(), Duration::ZERO)?;

        let mut metadata = Metadata::new();
        metadata.insert(MODEL_METADATA.to_string(), Value::String(model.to_string()));
        self.similar.set(
            query,
            self.query_vector(query),
            value,
            metadata,
            Duration::ZERO,
        )?;

        Ok(())
    }

    /// Runs the full flow: cached response, else admission, else backend
    ///
    /// Cache hits do not consume admission tokens. Backend errors are
    /// returned as-is and nothing is cached.
    pub async fn execute<F, Fut>(
        &self,
        identifier: &str,
        model: &str,
        query: &str,
        backend: F,
    ) -> Result<Outcome<V>, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, DomainError>>,
    {
        if let Some(hit) = self.lookup(model, query)? {
            return Ok(hit.into());
        }

        if !self.admit(identifier)? {
            debug!(identifier = %identifier, "Backend call throttled");
            return Ok(Outcome::Throttled);
        }

        let value = backend().await?;
        self.store(model, query, value.clone())?;

        Ok(Outcome::Computed(value))
    }
}
