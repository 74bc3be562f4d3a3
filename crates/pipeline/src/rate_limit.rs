//! Per-client fixed-window rate limiting.
//!
//! Each client key maps to a counter in a [`CounterCache`]. A request is
//! admitted while the counter is below `max_requests`; admission deletes the
//! counter and recreates it with the incremented value and a fresh TTL. Every
//! admitted request therefore pushes the window end out to
//! `now + window`, so a client that stays under the limit can keep extending
//! its window indefinitely.
//!
//! The read and the increment are separate cache operations. Concurrent
//! requests for the same key can both read the same count and both be
//! admitted.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::{CacheError, ClientKey, ConfigurationError, CounterCache, RateLimitError};

const CACHE_KEY_PREFIX: &str = "rate_limit_";

/// Limits applied to every client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    max_requests: u64,
    window: Duration,
}

impl RateLimitConfig {
    pub const DEFAULT_MAX_REQUESTS: u64 = 5;
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

    /// Returns an error if either limit is zero.
    pub fn new(max_requests: u64, window: Duration) -> Result<Self, ConfigurationError> {
        if max_requests == 0 {
            return Err(ConfigurationError::new(
                "rate limit max_requests must be at least 1",
            ));
        }
        if window.is_zero() {
            return Err(ConfigurationError::new(
                "rate limit window must be longer than zero",
            ));
        }
        Ok(Self {
            max_requests,
            window,
        })
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: Self::DEFAULT_MAX_REQUESTS,
            window: Self::DEFAULT_WINDOW,
        }
    }
}

/// Result of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request may proceed. `count` includes this request.
    Allowed { count: u64 },
    /// The client is over its limit until the counter expires.
    Rejected { retry_after: Duration },
}

/// Fixed-window limiter over a shared [`CounterCache`].
#[derive(Clone)]
pub struct RateLimiter {
    cache: Arc<dyn CounterCache>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(cache: Arc<dyn CounterCache>, config: RateLimitConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Counts one request for `client` and decides whether it is admitted.
    pub async fn admit(&self, client: &ClientKey) -> Result<Admission, CacheError> {
        let key = cache_key(client);
        let window = self.config.window;

        let current = self.cache.get_or_insert(&key, 0, window).await?;
        if current.count >= self.config.max_requests {
            tracing::info!(
                count = current.count,
                retry_after_secs = current.expires_in.as_secs(),
                "Rate limit exceeded"
            );
            return Ok(Admission::Rejected {
                retry_after: current.expires_in,
            });
        }

        // Delete-then-recreate so the incremented counter gets a fresh TTL.
        self.cache.delete(&key).await?;
        let updated = self
            .cache
            .get_or_insert(&key, current.count + 1, window)
            .await?;
        tracing::debug!(count = updated.count, "Rate limit admitted request");

        Ok(Admission::Allowed {
            count: updated.count,
        })
    }

    /// Like [`admit`](Self::admit) but reports rejection as an error.
    pub async fn check(&self, client: &ClientKey) -> Result<(), RateLimitError> {
        match self.admit(client).await? {
            Admission::Allowed { .. } => Ok(()),
            Admission::Rejected { retry_after } => Err(RateLimitError::Exceeded { retry_after }),
        }
    }
}

/// Cache key for `client`: a fixed prefix plus the hex SHA-256 of the key.
pub fn cache_key(client: &ClientKey) -> String {
    let digest = Sha256::digest(client.as_str().as_bytes());
    format!("{CACHE_KEY_PREFIX}{digest:x}")
}
