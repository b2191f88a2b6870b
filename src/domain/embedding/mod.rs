//! Embedding domain - the seam for plugging query vectors into the similarity cache

mod provider;

pub use provider::Embedder;

#[cfg(test)]
pub use provider::MockEmbedder;
