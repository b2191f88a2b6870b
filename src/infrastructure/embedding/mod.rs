//! Embedder implementations

mod hash;

pub use hash::HashEmbedder;
