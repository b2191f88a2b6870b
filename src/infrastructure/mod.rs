//! Infrastructure layer - In-memory managers, embedders and services

pub mod cache;
pub mod embedding;
pub mod logging;
pub mod observability;
pub mod rate_limit;
pub mod semantic_cache;
pub mod services;
