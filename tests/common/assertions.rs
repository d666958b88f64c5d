//! Assertion helpers
//!
//! A polling helper for state that settles asynchronously.

use std::time::Duration;

/// Poll `condition` every 10ms until it holds; panic after `timeout`
pub async fn wait_until<F>(what: &str, timeout: Duration, mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("Timed out after {:?} waiting for {}", timeout, what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Default patience for [`wait_until`]
pub const SETTLE: Duration = Duration::from_secs(3);
