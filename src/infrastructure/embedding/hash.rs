//! Feature-hashing embedder

use sha2::{Digest, Sha256};

use crate::domain::embedding::Embedder;
use crate::domain::DomainError;

/// Default vector length
pub const DEFAULT_DIMENSIONS: usize = 256;

/// Deterministic bag-of-words embedder
///
/// Each lowercase word is hashed with SHA-256; the digest picks a
/// dimension and a sign. The result is L2-normalized, so cosine similarity
/// between two embeddings approximates their word overlap. Texts without
/// words embed to an empty vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of `dimensions` components
    pub fn new(dimensions: usize) -> Result<Self, DomainError> {
        if dimensions == 0 {
            return Err(DomainError::configuration(
                "embedding dimensions must be positive",
            ));
        }

        Ok(Self { dimensions })
    }

    fn bucket(&self, word: &str) -> (usize, f64) {
        let digest = Sha256::digest(word.as_bytes());

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let slot = (u64::from_be_bytes(head) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };

        (slot, sign)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f64>, DomainError> {
        let mut vector = vec![0.0; self.dimensions];
        let mut words = 0usize;

        for word in text.split_whitespace() {
            let (slot, sign) = self.bucket(&word.to_lowercase());
            vector[slot] += sign;
            words += 1;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if words == 0 || norm == 0.0 {
            return Ok(Vec::new());
        }

        for x in &mut vector {
            *x /= norm;
        }

        Ok(vector)
    }

    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
