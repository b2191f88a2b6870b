//! Token bucket and sliding-window bucket
//!
//! Refill is lazy: tokens are recomputed from the elapsed whole seconds
//! whenever a bucket is touched, never by a background ticker.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::stats::{wall_clock, BucketSnapshot};

/// Trailing window used for burst accounting
pub const BURST_WINDOW: Duration = Duration::from_secs(60);

/// Common view over the bucket kinds kept by a limiter
pub trait Bucket: Send {
    /// Last time tokens were added
    fn last_refill(&self) -> Instant;

    /// Projected state at `now`, without mutating the bucket
    fn snapshot(&self, now: Instant) -> BucketSnapshot;
}

/// Per-identifier token bucket
///
/// `rate_limit` is interpreted as requests per minute: the bucket holds
/// `rate_limit` tokens and regains `max(1, rate_limit / 60)` per second.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: u32,
    tokens: u32,
    refill_rate: u32,
    last_refill: Instant,
}

impl TokenBucket {
    /// Creates a full bucket
    pub fn new(rate_limit: u32, now: Instant) -> Self {
        Self {
            capacity: rate_limit,
            tokens: rate_limit,
            refill_rate: Self::refill_rate_for(rate_limit),
            last_refill: now,
        }
    }

    /// Tokens per second for a per-minute limit, never below 1
    pub fn refill_rate_for(rate_limit: u32) -> u32 {
        (rate_limit / 60).max(1)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn tokens(&self) -> u32 {
        self.tokens
    }

    pub fn refill_rate(&self) -> u32 {
        self.refill_rate
    }

    fn tokens_to_add(&self, now: Instant) -> u64 {
        let elapsed_secs = now.saturating_duration_since(self.last_refill).as_secs();
        elapsed_secs.saturating_mul(u64::from(self.refill_rate))
    }

    /// Tokens that would be available at `now`
    pub fn available_at(&self, now: Instant) -> u32 {
        let projected = u64::from(self.tokens).saturating_add(self.tokens_to_add(now));
        projected.min(u64::from(self.capacity)) as u32
    }

    /// Adds `floor(elapsed_secs) * refill_rate` tokens, capped at capacity
    pub fn refill(&mut self, now: Instant) {
        if self.tokens_to_add(now) > 0 {
            self.tokens = self.available_at(now);
            self.last_refill = now;
        }
    }

    /// Refills, then takes `n` tokens if all of them are available
    pub fn try_consume(&mut self, n: u32, now: Instant) -> bool {
        self.refill(now);

        if self.tokens >= n {
            self.tokens -= n;
            true
        } else {
            false
        }
    }

    /// Changes capacity and refill rate, clamping the balance down
    pub fn set_rate_limit(&mut self, rate_limit: u32) {
        self.capacity = rate_limit;
        self.refill_rate = Self::refill_rate_for(rate_limit);
        self.tokens = self.tokens.min(self.capacity);
    }
}

impl Bucket for TokenBucket {
    fn last_refill(&self) -> Instant {
        self.last_refill
    }

    fn snapshot(&self, now: Instant) -> BucketSnapshot {
        BucketSnapshot {
            capacity: self.capacity,
            current_tokens: self.available_at(now),
            refill_rate: self.refill_rate,
            last_refill: wall_clock(self.last_refill, now),
            burst_capacity: None,
            window_requests: None,
        }
    }
}

/// Token bucket with an additional cap on admissions per trailing minute
#[derive(Debug, Clone)]
pub struct SlidingWindowBucket {
    bucket: TokenBucket,
    burst_capacity: u32,
    request_history: VecDeque<Instant>,
}

impl SlidingWindowBucket {
    /// Creates a full bucket with an empty window
    pub fn new(rate_limit: u32, burst_capacity: u32, now: Instant) -> Self {
        Self {
            bucket: TokenBucket::new(rate_limit, now),
            burst_capacity,
            request_history: VecDeque::new(),
        }
    }

    pub fn bucket(&self) -> &TokenBucket {
        &self.bucket
    }

    pub fn burst_capacity(&self) -> u32 {
        self.burst_capacity
    }

    fn window_count_at(&self, now: Instant) -> usize {
        self.request_history
            .iter()
            .filter(|ts| now.saturating_duration_since(**ts) < BURST_WINDOW)
            .count()
    }

    /// Number of admissions recorded within the window ending at `now`
    pub fn window_count(&self, now: Instant) -> usize {
        self.window_count_at(now)
    }

    fn purge_window(&mut self, now: Instant) {
        while let Some(oldest) = self.request_history.front() {
            if now.saturating_duration_since(*oldest) >= BURST_WINDOW {
                self.request_history.pop_front();
            } else {
                break;
            }
        }
    }

    /// Admits iff the window holds fewer than `burst_capacity` admissions
    /// and at least one token is available; consumes one token on success
    pub fn try_admit(&mut self, now: Instant) -> bool {
        self.bucket.refill(now);
        self.purge_window(now);

        let under_burst = self.request_history.len() < self.burst_capacity as usize;
        if under_burst && self.bucket.tokens > 0 {
            self.bucket.tokens -= 1;
            self.request_history.push_back(now);
            true
        } else {
            false
        }
    }

    /// Refills and returns the token balance
    pub fn remaining(&mut self, now: Instant) -> u32 {
        self.bucket.refill(now);
        self.bucket.tokens
    }

    /// Updates both limits, clamping the token balance down
    pub fn set_limits(&mut self, rate_limit: u32, burst_capacity: u32) {
        self.bucket.set_rate_limit(rate_limit);
        self.burst_capacity = burst_capacity;
    }
}

impl Bucket for SlidingWindowBucket {
    fn last_refill(&self) -> Instant {
        self.bucket.last_refill
    }

    fn snapshot(&self, now: Instant) -> BucketSnapshot {
        BucketSnapshot {
            burst_capacity: Some(self.burst_capacity),
            window_requests: Some(self.window_count_at(now)),
            ..self.bucket.snapshot(now)
        }
    }
}
