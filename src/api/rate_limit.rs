use crate::common::config::RateLimitConfig;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitExceeded {
    /// Seconds until the oldest request in the window expires.
    pub retry_after: f64,
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Records a request from `client` or reports how long it has to wait.
    async fn check(&self, client: &str) -> Result<(), RateLimitExceeded>;
}

/// At most `max_requests` per client in any `window`.
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    clients: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }
}

impl From<&RateLimitConfig> for SlidingWindowLimiter {
    fn from(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn check(&self, client: &str) -> Result<(), RateLimitExceeded> {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        clients.retain(|_, stamps| {
            while stamps.front().map_or(false, |t| now.duration_since(*t) >= self.window) {
                stamps.pop_front();
            }
            !stamps.is_empty()
        });

        let stamps = clients.entry(client.to_string()).or_default();
        if stamps.len() >= self.max_requests {
            let oldest = stamps.front().copied().unwrap_or(now);
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            let retry_after = wait.as_secs_f64().max(0.001);
            tracing::warn!("Rate limit exceeded for {}", client);
            return Err(RateLimitExceeded { retry_after });
        }

        stamps.push_back(now);
        Ok(())
    }
}
