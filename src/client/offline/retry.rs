//! # Retry Logic and Backoff Strategies
//!
//! Bounded retry for REST refreshes and the delay schedule used by the
//! realtime reconnect loop.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chatsync::client::offline::retry::RetryPolicy;
//!
//! # async fn example(directory: &dyn chatsync::client::ChatDirectory) {
//! let policy = RetryPolicy::default();
//! let result = policy.run("list_conversations", || directory.list_conversations()).await;
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::client::error::DirectoryError;

/// Backoff strategy configuration
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed interval between retries
    Fixed {
        interval: Duration,
    },
    /// Exponential backoff with jitter
    Exponential {
        /// Delay before the first retry
        base: Duration,
        /// Upper bound of any delay (before jitter)
        max: Duration,
        /// Jitter factor (0.0 to 1.0), added on top of the delay
        jitter: f64,
    },
}

impl BackoffStrategy {
    /// Reconnect schedule of the realtime channel: 1s doubling up to 30s
    pub fn reconnect() -> Self {
        BackoffStrategy::Exponential {
            base: Duration::from_secs(1),
            max: Duration::from_secs(30),
            jitter: 0.1,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed { interval } => *interval,
            BackoffStrategy::Exponential { base, max, jitter } => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                let delay = base.saturating_mul(factor).min(*max);

                if *jitter > 0.0 {
                    let extra = rand::thread_rng().gen_range(0.0..=jitter.min(1.0));
                    delay + delay.mul_f64(extra)
                } else {
                    delay
                }
            }
        }
    }
}

/// Stateful walk through a [`BackoffStrategy`]
#[derive(Debug, Clone)]
pub struct Backoff {
    strategy: BackoffStrategy,
    attempt: u32,
}

impl Backoff {
    pub fn new(strategy: BackoffStrategy) -> Self {
        Self { strategy, attempt: 0 }
    }

    /// Delay to wait before the next attempt
    pub fn next_delay(&mut self) -> Duration {
        self.attempt = self.attempt.saturating_add(1);
        self.strategy.delay_for(self.attempt)
    }

    /// Start over after a success
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }
}

/// Bounded retry of fallible directory calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_attempts(3)
    }
}

impl RetryPolicy {
    /// Exactly one attempt
    pub fn none() -> Self {
        Self::with_attempts(1)
    }

    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: BackoffStrategy::Exponential {
                base: Duration::from_millis(250),
                max: Duration::from_secs(4),
                jitter: 0.1,
            },
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, DirectoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DirectoryError>>,
    {
        let mut backoff = Backoff::new(self.backoff.clone());
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && backoff.attempts() + 1 < self.max_attempts => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        "[RETRY] {} failed (attempt {}/{}): {}; retrying in {:?}",
                        label,
                        backoff.attempts(),
                        self.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
