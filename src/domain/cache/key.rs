//! Cache key derivation
//!
//! Exact-cache keys are derived from a prefix (e.g. `llm_query`) and an
//! ordered list of parameters (model name, query text, ...). The digest is
//! SHA-256 truncated to [`KEY_HEX_LEN`] hex characters, i.e. 64 bits.
//! Changing the truncation changes the collision probability and therefore
//! which requests are deduplicated against each other.

use std::fmt::Debug;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest (64 bits)
pub const KEY_HEX_LEN: usize = 16;

/// Separator placed between the prefix and each parameter before hashing
const SEPARATOR: &str = ":";

/// Trait for generating cache keys from input data
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates a cache key from the given parameters
    fn generate(&self, params: &CacheKeyParams) -> String;
}

/// Parameters for cache key generation
///
/// Parameter order is significant: `("a", "b")` and `("b", "a")` produce
/// different keys.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyParams {
    /// Namespace prefix (e.g. `llm_query`, `cv_classify`)
    pub prefix: String,
    /// Ordered parameters
    pub params: Vec<String>,
}

impl CacheKeyParams {
    /// Creates new cache key parameters with a prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter
    pub fn with_param(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    /// Appends a serializable value as its JSON representation
    pub fn with_serializable<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        self.params.push(serde_json::to_string(value)?);
        Ok(self)
    }

    fn canonical(&self) -> String {
        let mut parts = Vec::with_capacity(self.params.len() + 1);
        parts.push(self.prefix.as_str());
        parts.extend(self.params.iter().map(String::as_str));
        parts.join(SEPARATOR)
    }
}

/// Key generator producing truncated SHA-256 hex digests
#[derive(Debug, Clone, Default)]
pub struct Sha256KeyGenerator;

impl Sha256KeyGenerator {
    /// Creates a new generator
    pub fn new() -> Self {
        Self
    }
}

impl CacheKeyGenerator for Sha256KeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        let digest = Sha256::digest(params.canonical().as_bytes());
        let mut key = hex::encode(digest);
        key.truncate(KEY_HEX_LEN);
        key
    }
}

/// Convenience wrapper: derive a key from a prefix and parameters
pub fn derive_key<I, S>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let params = params
        .into_iter()
        .fold(CacheKeyParams::new(prefix), |acc, p| acc.with_param(p));

    Sha256KeyGenerator::new().generate(&params)
}
