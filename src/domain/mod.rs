//! Domain layer - cache, similarity and admission models and traits

pub mod cache;
pub mod embedding;
pub mod error;
pub mod rate_limit;
pub mod semantic_cache;
pub mod traits;

pub use cache::{
    derive_key, CacheEntry, CacheKeyGenerator, CacheKeyParams, CacheStats, ExactCache,
    ExactCacheConfig, Sha256KeyGenerator, KEY_HEX_LEN,
};
pub use embedding::Embedder;
pub use error::DomainError;
pub use rate_limit::{
    AdmissionLimiter, AdmissionStats, BucketSnapshot, BurstAdmissionLimiter,
    GlobalAdmissionStats, RateLimitConfig, SlidingWindowBucket, TokenBucket,
};
pub use semantic_cache::{
    Metadata, SemanticCacheConfig, SimilarityCache, SimilarityEntry, SimilarityMatch,
};
pub use traits::Sweep;
