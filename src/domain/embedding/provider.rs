//! Embedder trait definition

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Produces query vectors for the similarity cache
///
/// Any implementation works behind the same contract: an empty vector
/// means "no embedding", which makes the cache fall back to word overlap.
#[cfg_attr(test, automock)]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f64>, DomainError>;

    /// Get the embedder name
    fn name(&self) -> &'static str;

    /// Get the vector length produced for non-empty input
    fn dimensions(&self) -> usize;
}
