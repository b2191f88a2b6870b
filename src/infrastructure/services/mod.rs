//! Infrastructure services

mod cleanup;
mod inference_cache_service;

pub use cleanup::{run_sweeps, CleanupTask};
pub use inference_cache_service::{CacheHit, InferenceCacheService, Outcome};
