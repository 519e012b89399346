//! Shared bounded-retry-with-backoff helper. Used by the source HTTP client
//! and by `norma-embed`'s backend calls — both treat the same transient-vs-
//! permanent split, just against different error enums.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Lets a caller's own error type say whether a failure is worth retrying.
/// Transient remote failures (network errors, 429, 5xx) return `true`;
/// permanent ones (404, malformed payload) return `false`.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Bounded exponential backoff with additive jitter.
#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl BackoffConfig {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay }
    }

    fn delay_for(self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1u32 << attempt.min(16));
        let jitter_ms = rand::rng().random_range(0..=self.base_delay.as_millis() as u64);
        exp + Duration::from_millis(jitter_ms)
    }
}

/// Runs `op` until it succeeds, its error is non-retryable, or `config.max_attempts`
/// is exhausted. Sleeps `delay_for(attempt)` between retries.
pub async fn retry_with_backoff<T, E, F, Fut>(config: BackoffConfig, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= config.max_attempts || !err.is_retryable() {
                    return Err(err);
                }
                tokio::time::sleep(config.delay_for(attempt - 1)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug)]
    struct Transient;
    impl Retryable for Transient {
        fn is_retryable(&self) -> bool {
            true
        }
    }

    #[derive(Debug)]
    struct Permanent;
    impl Retryable for Permanent {
        fn is_retryable(&self) -> bool {
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let attempts = Cell::new(0);
        let config = BackoffConfig::new(5, Duration::from_millis(10));
        let result: Result<i32, Transient> = retry_with_backoff(config, || {
            attempts.set(attempts.get() + 1);
            async move {
                if attempts.get() < 3 {
                    Err(Transient)
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let attempts = Cell::new(0);
        let config = BackoffConfig::new(3, Duration::from_millis(5));
        let result: Result<i32, Transient> = retry_with_backoff(config, || {
            attempts.set(attempts.get() + 1);
            async move { Err(Transient) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_immediately_on_non_retryable_error() {
        let attempts = Cell::new(0);
        let config = BackoffConfig::new(5, Duration::from_millis(5));
        let result: Result<i32, Permanent> = retry_with_backoff(config, || {
            attempts.set(attempts.get() + 1);
            async move { Err(Permanent) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }
}
