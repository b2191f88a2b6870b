//! CLI module for the inference cache
//!
//! Provides subcommands:
//! - `key`: derive an exact-cache key
//! - `simulate`: drive a synthetic workload through the caches and limiters

pub mod key;
pub mod simulate;

use clap::{Parser, Subcommand};

/// PMP Inference Cache - response caching and admission control for model backends
#[derive(Parser)]
#[command(name = "pmp-inference-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive the exact-cache key for a prefix and parameters
    Key(key::KeyArgs),

    /// Run a synthetic workload and print cache and admission statistics
    Simulate(simulate::SimulateArgs),
}
