use crate::common::config::RetryConfig;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.delay(),
        }
    }
}

impl RetryPolicy {
    /// Runs `operation` until it succeeds, fails with an error `retryable` rejects,
    /// or `max_attempts` is used up. The last error is returned.
    pub async fn run<T, E, F, Fut, P>(&self, mut operation: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && retryable(&err) => {
                    tracing::warn!("Retry {}/{} due to: {}", attempt, max_attempts, err);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt >= max_attempts {
                        tracing::error!("Max retries reached: {}", err);
                    }
                    return Err(err);
                }
            }
        }
    }
}
