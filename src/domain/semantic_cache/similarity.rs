//! Similarity measures and tokenization used by the similarity cache

use std::collections::HashSet;

/// Tokens shorter than or equal to this many characters are not indexed
pub const MIN_INDEX_TOKEN_CHARS: usize = 3;

/// Calculate cosine similarity between two vectors
///
/// Returns 0 when either vector is empty, the lengths differ, or either
/// norm is zero.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Lowercased whitespace-separated word set
pub fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Jaccard similarity of the two texts' lowercase word sets
///
/// `|A ∩ B| / |A ∪ B|`, 0 when the union is empty.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let words_a = word_set(a);
    let words_b = word_set(b);

    let union = words_a.union(&words_b).count();
    if union == 0 {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    intersection as f64 / union as f64
}

/// Tokens registered in the inverted index, in first-occurrence order
///
/// Lowercased words longer than [`MIN_INDEX_TOKEN_CHARS`] characters,
/// de-duplicated.
pub fn index_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| t.chars().count() > MIN_INDEX_TOKEN_CHARS)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Similarity between a lookup and a stored entry
///
/// Cosine when both vectors are present, Jaccard over the query text
/// otherwise.
pub fn query_similarity(query: &str, vector: &[f64], other_query: &str, other_vector: &[f64]) -> f64 {
    if !vector.is_empty() && !other_vector.is_empty() {
        cosine_similarity(vector, other_vector)
    } else {
        jaccard_similarity(query, other_query)
    }
}
