//! Process-local [`CounterCache`].
//!
//! Counters live in a `HashMap` behind a mutex and expire by TTL. An expired
//! key is replaced when it is next written; other expired entries are swept
//! on insert at most once per [`SWEEP_INTERVAL`]. Clocks come from
//! `tokio::time` so tests can pause and advance them.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use pipeline::{CacheError, CounterCache, CounterEntry};

/// Minimum time between two sweeps of expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Slot {
    count: u64,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Counters {
    slots: HashMap<String, Slot>,
    last_sweep: Option<Instant>,
}

impl Counters {
    fn sweep_if_due(&mut self, now: Instant) {
        let due = self
            .last_sweep
            .is_none_or(|last| now.duration_since(last) >= SWEEP_INTERVAL);
        if due {
            self.slots.retain(|_, slot| slot.expires_at > now);
            self.last_sweep = Some(now);
        }
    }
}

/// In-memory counter store shared by every request handled by this process.
#[derive(Debug, Default)]
pub struct MemoryCounterCache {
    entries: Mutex<Counters>,
}

impl MemoryCounterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet dropped.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|counters| counters.slots.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> CacheError {
    CacheError::new("counter cache lock poisoned")
}

#[async_trait]
impl CounterCache for MemoryCounterCache {
    async fn get_or_insert(
        &self,
        key: &str,
        initial: u64,
        ttl: Duration,
    ) -> Result<CounterEntry, CacheError> {
        let now = Instant::now();
        let mut counters = self.entries.lock().map_err(poisoned)?;

        if let Some(slot) = counters.slots.get(key) {
            if slot.expires_at > now {
                return Ok(CounterEntry {
                    count: slot.count,
                    expires_in: slot.expires_at - now,
                });
            }
        }

        counters.sweep_if_due(now);
        counters.slots.insert(
            key.to_string(),
            Slot {
                count: initial,
                expires_at: now + ttl,
            },
        );
        Ok(CounterEntry {
            count: initial,
            expires_in: ttl,
        })
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().map_err(poisoned)?.slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pipeline::{Admission, ClientKey, RateLimitConfig, RateLimiter};

    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn absent_key_is_created_with_initial_value() {
        let cache = MemoryCounterCache::new();

        let entry = cache.get_or_insert("k", 0, MINUTE).await.unwrap();

        assert_eq!(
            entry,
            CounterEntry {
                count: 0,
                expires_in: MINUTE
            }
        );
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn live_key_keeps_value_and_reports_remaining_ttl() {
        let cache = MemoryCounterCache::new();
        cache.get_or_insert("k", 3, MINUTE).await.unwrap();

        tokio::time::advance(Duration::from_secs(45)).await;
        let entry = cache.get_or_insert("k", 0, MINUTE).await.unwrap();

        assert_eq!(entry.count, 3);
        assert_eq!(entry.expires_in, Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_key_is_recreated() {
        let cache = MemoryCounterCache::new();
        cache.get_or_insert("k", 3, MINUTE).await.unwrap();

        tokio::time::advance(MINUTE).await;
        let entry = cache.get_or_insert("k", 0, MINUTE).await.unwrap();

        assert_eq!(entry.count, 0);
        assert_eq!(entry.expires_in, MINUTE);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_dropped_on_insert() {
        let cache = MemoryCounterCache::new();
        cache.get_or_insert("a", 1, MINUTE).await.unwrap();
        cache.get_or_insert("b", 1, MINUTE).await.unwrap();

        tokio::time::advance(MINUTE).await;
        cache.get_or_insert("c", 1, MINUTE).await.unwrap();

        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_runs_at_most_once_per_interval() {
        let cache = MemoryCounterCache::new();
        cache
            .get_or_insert("short", 1, Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(20)).await;
        cache.get_or_insert("b", 1, MINUTE).await.unwrap();
        assert_eq!(cache.len(), 2);

        tokio::time::advance(SWEEP_INTERVAL - Duration::from_secs(20)).await;
        cache.get_or_insert("c", 1, MINUTE).await.unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = MemoryCounterCache::new();
        cache.get_or_insert("k", 1, MINUTE).await.unwrap();

        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();

        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn limiter_window_resets_after_quiet_period() {
        let limiter = RateLimiter::new(
            Arc::new(MemoryCounterCache::new()),
            RateLimitConfig::new(2, MINUTE).unwrap(),
        );
        let client = ClientKey::new("abc");

        limiter.check(&client).await.unwrap();
        limiter.check(&client).await.unwrap();
        assert!(matches!(
            limiter.admit(&client).await.unwrap(),
            Admission::Rejected { retry_after } if retry_after == MINUTE
        ));

        tokio::time::advance(MINUTE).await;
        assert_eq!(
            limiter.admit(&client).await.unwrap(),
            Admission::Allowed { count: 1 }
        );
    }
}
