//! Cross-cutting domain traits

mod sweep;

pub use sweep::Sweep;
