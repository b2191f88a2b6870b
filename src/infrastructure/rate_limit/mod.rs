//! Rate limit infrastructure - In-memory admission limiters

mod registry;
mod sliding_window;
mod token_bucket;

pub use registry::BucketRegistry;
pub use sliding_window::SlidingWindowLimiter;
pub use token_bucket::TokenBucketLimiter;
