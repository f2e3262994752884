//! Retry with backoff for model calls.
//!
//! Two kinds of failure get different waits, both counted against the same
//! attempt budget:
//!
//! | Failure | Wait before next attempt |
//! |---------|--------------------------|
//! | rate limited (HTTP 429) | fixed `rate_limit_cooldown` (default 10 s) |
//! | anything else | uniform random in `[backoff_min, backoff_max)` × attempt number |
//!
//! After `max_attempts` the last error is returned to the caller unchanged.

use crate::config::GenerationConfig;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Errors that can tell a throttling response apart from other failures.
pub trait Retryable {
    fn is_rate_limited(&self) -> bool;
}

/// Attempt budget and wait times.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_cooldown: Duration,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            rate_limit_cooldown: Duration::from_secs_f64(config.rate_limit_cooldown_secs),
            backoff_min: Duration::from_secs_f64(config.backoff_min_secs),
            backoff_max: Duration::from_secs_f64(config.backoff_max_secs),
        }
    }

    /// Wait before the attempt following `attempt` (1-based).
    pub fn delay(&self, attempt: u32, rate_limited: bool) -> Duration {
        if rate_limited {
            return self.rate_limit_cooldown;
        }
        let base = if self.backoff_min < self.backoff_max {
            rand::rng().random_range(self.backoff_min..self.backoff_max)
        } else {
            self.backoff_min
        };
        base * attempt
    }
}

/// Run `operation` until it succeeds or the attempt budget runs out.
///
/// `max_attempts` below 1 is treated as 1. There is no sleep after the final
/// attempt.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= max_attempts => return Err(err),
            Err(err) => {
                let rate_limited = err.is_rate_limited();
                let wait = policy.delay(attempt, rate_limited);
                if rate_limited {
                    warn!("rate limited (attempt {attempt}/{max_attempts}), cooling down {wait:?}");
                } else {
                    warn!("attempt {attempt}/{max_attempts} failed: {err}; retrying in {wait:?}");
                }
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
