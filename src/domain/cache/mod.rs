//! Cache domain - exact cache entries, keys and statistics

mod config;
mod entry;
mod key;
mod repository;
mod stats;

pub use config::ExactCacheConfig;
pub use entry::CacheEntry;
pub use key::{derive_key, CacheKeyGenerator, CacheKeyParams, Sha256KeyGenerator, KEY_HEX_LEN};
pub use repository::ExactCache;
pub use stats::CacheStats;
