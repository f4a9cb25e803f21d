//! Retry with exponential backoff
//!
//! Wraps a whole fallible async operation (for example one complete session
//! exchange). Attempts are `max_retries + 1`; the delay before retry `n`
//! (0-based) is `base_delay * 2^n`. When every attempt fails, the last error
//! is returned unchanged.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::SeinsightResult;

/// Retry budget for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay_ms: base_delay.as_millis() as u64,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
        }
    }

    /// Same base delay, different retry count
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Total number of attempts
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u64.saturating_pow(retry);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Run `operation` until it succeeds, the budget is spent, or it fails with
/// a non-retryable error.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> SeinsightResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SeinsightResult<T>>,
{
    let mut retry = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => {
                tracing::debug!("[Retry] {} failed with non-retryable error: {}", label, e);
                return Err(e);
            }
            Err(e) if retry >= policy.max_retries => {
                tracing::error!(
                    "[Retry] {} failed after {} attempts: {}",
                    label,
                    policy.attempts(),
                    e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(retry);
                tracing::warn!(
                    "[Retry] {} attempt {}/{} failed ({}); retrying in {:?}",
                    label,
                    retry + 1,
                    policy.attempts(),
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                retry += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SeinsightError;
    use crate::oracle::BatchValidationError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn timeout(n: u32) -> SeinsightError {
        SeinsightError::ReplyTimeout {
            session_id: format!("s{n}"),
            waited: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.attempts(), 4);
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }

    #[test]
    fn test_partial_policy_uses_defaults() {
        let policy: RetryPolicy = toml::from_str("max_retries = 1").unwrap();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.base_delay_ms, 1000);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result = retry_with_backoff(&policy, "test", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(timeout(n))
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_exhausted() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let err = retry_with_backoff(&policy, "test", move || async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(timeout(n))
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match err {
            SeinsightError::ReplyTimeout { session_id, .. } => assert_eq!(session_id, "s2"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::new(5, Duration::from_millis(1));

        let err = retry_with_backoff(&policy, "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(SeinsightError::InvalidBatch(BatchValidationError::EmptyCid))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, SeinsightError::InvalidBatch(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
