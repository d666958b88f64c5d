//! # Resilience helpers
//!
//! - `optimistic.rs`: pending outgoing messages shown before the server echo
//! - `retry.rs`: bounded retry and backoff schedules

pub mod optimistic;
pub mod retry;

pub use optimistic::{OptimisticOutbox, PendingMessage, DEFAULT_PENDING_TTL};
pub use retry::{Backoff, BackoffStrategy, RetryPolicy};
