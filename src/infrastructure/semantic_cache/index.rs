//! Inverted token index used to pick similarity candidates

use std::collections::{HashMap, HashSet};

use crate::domain::semantic_cache::index_tokens;

/// Maps lowercase query tokens to the ids of entries containing them
///
/// Postings keep insertion order, so candidates (and ties between equally
/// similar entries) come out the same way on every run.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<String>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every indexable token of `query` for `id`
    pub fn insert(&mut self, id: &str, query: &str) {
        for token in index_tokens(query) {
            let ids = self.postings.entry(token).or_default();
            if !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
    }

    /// Drops `id` from the postings of `query`'s tokens
    pub fn remove(&mut self, id: &str, query: &str) {
        for token in index_tokens(query) {
            if let Some(ids) = self.postings.get_mut(&token) {
                ids.retain(|existing| existing != id);
                if ids.is_empty() {
                    self.postings.remove(&token);
                }
            }
        }
    }

    /// De-duplicated union of the postings of `query`'s tokens, ordered by
    /// query token, then by insertion
    pub fn candidates(&self, query: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for token in index_tokens(query) {
            if let Some(ids) = self.postings.get(&token) {
                for id in ids {
                    if seen.insert(id.as_str()) {
                        candidates.push(id.clone());
                    }
                }
            }
        }

        candidates
    }

    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    pub fn clear(&mut self) {
        self.postings.clear();
    }
}
