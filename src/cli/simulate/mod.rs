//! Simulate command - drives a synthetic workload through the service

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::cache::ExactCache;
use crate::domain::embedding::Embedder;
use crate::domain::rate_limit::{AdmissionLimiter, BurstAdmissionLimiter};
use crate::domain::semantic_cache::SimilarityCache;
use crate::domain::traits::Sweep;
use crate::infrastructure::cache::InMemoryExactCache;
use crate::infrastructure::embedding::HashEmbedder;
use crate::infrastructure::logging;
use crate::infrastructure::observability::init_metrics;
use crate::infrastructure::rate_limit::{SlidingWindowLimiter, TokenBucketLimiter};
use crate::infrastructure::semantic_cache::InMemorySimilarityCache;
use crate::infrastructure::services::{run_sweeps, CleanupTask, InferenceCacheService, Outcome};

const MODELS: &[&str] = &["gpt-4o", "claude-sonnet", "llama-3-70b"];

const QUERIES: &[&str] = &[
    "what is the capital of france",
    "explain rust ownership and borrowing",
    "summarize the quarterly sales report",
    "translate good morning into spanish",
    "how does a token bucket limiter work",
    "write a haiku about autumn leaves",
    "list the planets of the solar system",
    "describe the water cycle for children",
];

const SUFFIXES: &[&str] = &["please", "briefly", "in detail", "again"];

/// Arguments for the simulate command
#[derive(Args, Clone)]
pub struct SimulateArgs {
    /// Number of requests to send
    #[arg(long, default_value_t = 500)]
    pub requests: usize,

    /// Number of distinct callers
    #[arg(long, default_value_t = 4)]
    pub identifiers: usize,

    /// Per-caller token budget per minute (one token per query word)
    #[arg(long, default_value_t = 400)]
    pub tokens_per_minute: u32,

    /// Simulated backend latency in milliseconds
    #[arg(long, default_value_t = 0)]
    pub backend_latency_ms: u64,

    /// Seed for a reproducible workload
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print Prometheus metrics after the statistics
    #[arg(long)]
    pub prometheus: bool,
}

/// One synthetic request
#[derive(Debug, Clone, PartialEq)]
struct Request {
    identifier: String,
    model: &'static str,
    query: String,
}

impl Request {
    fn cost(&self) -> u32 {
        self.query.split_whitespace().count().max(1) as u32
    }
}

/// Generates requests with repeated, reworded and fresh queries
struct Workload {
    rng: StdRng,
    identifiers: usize,
}

impl Workload {
    fn new(seed: Option<u64>, identifiers: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            identifiers: identifiers.max(1),
        }
    }

    fn next_request(&mut self) -> Request {
        let identifier = format!("caller-{}", self.rng.gen_range(0..self.identifiers));
        let model = MODELS.choose(&mut self.rng).copied().unwrap_or(MODELS[0]);
        let base = QUERIES.choose(&mut self.rng).copied().unwrap_or(QUERIES[0]);

        let query = match self.rng.gen_range(0..10) {
            0..=5 => base.to_string(),
            6..=8 => {
                let suffix = SUFFIXES.choose(&mut self.rng).copied().unwrap_or(SUFFIXES[0]);
                format!("{} {}", base, suffix)
            }
            _ => format!("{} variant{}", base, self.rng.gen_range(0..1000)),
        };

        Request {
            identifier,
            model,
            query,
        }
    }
}

#[derive(Debug, Default)]
struct Tally {
    exact: u64,
    similar: u64,
    computed: u64,
    throttled: u64,
    over_budget: u64,
}

/// Run the simulate command
pub async fn run(args: SimulateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().unwrap_or_default();
    config.metrics.enabled |= args.prometheus;
    logging::init_logging(&config.logging);
    config.validate()?;

    let metrics = init_metrics(&config.metrics);

    let exact = Arc::new(InMemoryExactCache::<String>::with_config(
        config.exact_cache.clone(),
    )?);
    let similar = Arc::new(InMemorySimilarityCache::<String>::with_config(
        config.similarity_cache.clone(),
    )?);
    let burst = Arc::new(SlidingWindowLimiter::with_config(&config.rate_limit)?);
    let budget = Arc::new(TokenBucketLimiter::with_config(&config.rate_limit)?);

    let mut service = InferenceCacheService::new(
        exact.clone(),
        similar.clone(),
        burst.clone(),
        config.rate_limit.clone(),
    );
    if config.embedding.enabled {
        let embedder = HashEmbedder::new(config.embedding.dimensions)?;
        info!(
            embedder = embedder.name(),
            dimensions = embedder.dimensions(),
            "Query embeddings enabled"
        );
        service = service.with_embedder(Arc::new(embedder));
    }

    let targets: Vec<Arc<dyn Sweep>> = vec![
        exact.clone(),
        similar.clone(),
        burst.clone(),
        budget.clone(),
    ];
    let cleanup = CleanupTask::spawn(targets.clone(), config.cleanup.interval());

    info!(requests = args.requests, "Starting simulated workload");

    let mut workload = Workload::new(args.seed, args.identifiers);
    let mut tally = Tally::default();
    let latency = Duration::from_millis(args.backend_latency_ms);

    for _ in 0..args.requests {
        let request = workload.next_request();

        if !budget.allow_n(&request.identifier, args.tokens_per_minute, request.cost())? {
            tally.over_budget += 1;
            continue;
        }

        let model = request.model;
        let query = request.query.as_str();
        let outcome = service
            .execute(&request.identifier, model, query, move || async move {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                Ok(format!("[{}] response to: {}", model, query))
            })
            .await?;

        match outcome {
            Outcome::Exact(_) => tally.exact += 1,
            Outcome::Similar { .. } => tally.similar += 1,
            Outcome::Computed(_) => tally.computed += 1,
            Outcome::Throttled => tally.throttled += 1,
        }
    }

    cleanup.shutdown().await;
    let swept = run_sweeps(&targets);

    let report = json!({
        "requests": args.requests,
        "outcomes": {
            "exact": tally.exact,
            "similar": tally.similar,
            "computed": tally.computed,
            "throttled": tally.throttled,
            "over_budget": tally.over_budget,
        },
        "exact_cache": exact.stats()?,
        "similarity_cache": similar.stats()?,
        "admission": burst.global_stats()?,
        "burst_buckets": burst.stats()?,
        "token_buckets": budget.stats()?,
        "swept": swept,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(metrics) = metrics {
        println!("{}", metrics.render());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_workload_is_reproducible() {
        let mut a = Workload::new(Some(7), 3);
        let mut b = Workload::new(Some(7), 3);

        for _ in 0..50 {
            assert_eq!(a.next_request(), b.next_request());
        }
    }

    #[test]
    fn test_workload_stays_within_identifiers() {
        let mut workload = Workload::new(Some(1), 2);

        for _ in 0..100 {
            let request = workload.next_request();
            assert!(request.identifier == "caller-0" || request.identifier == "caller-1");
            assert!(MODELS.contains(&request.model));
            assert!(request.cost() >= 5);
        }
    }
}
