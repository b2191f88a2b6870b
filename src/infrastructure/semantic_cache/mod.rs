//! Semantic cache infrastructure - Similarity cache implementations

mod in_memory;
mod index;

pub use in_memory::InMemorySimilarityCache;
pub use index::InvertedIndex;
