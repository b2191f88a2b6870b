//! Cache infrastructure - Exact cache implementations

mod in_memory;

pub use in_memory::InMemoryExactCache;
