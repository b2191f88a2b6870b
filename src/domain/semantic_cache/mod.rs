//! Semantic cache domain models and traits
//!
//! Matches requests that are close to a previously answered one rather
//! than requiring exact key equality. Closeness is the cosine similarity of
//! caller-supplied vectors, or word-set overlap when no vector is given.

mod config;
mod entry;
mod repository;
mod similarity;

pub use config::SemanticCacheConfig;
pub use entry::{Metadata, SimilarityEntry};
pub use repository::{SimilarityCache, SimilarityMatch};
pub use similarity::{
    cosine_similarity, index_tokens, jaccard_similarity, query_similarity, word_set,
    MIN_INDEX_TOKEN_CHARS,
};
