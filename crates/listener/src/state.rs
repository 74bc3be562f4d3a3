//! Shared application state handed to every handler and middleware.

use std::sync::Arc;

use analyzer::{MetricsRecorder, PolicyAnalyzer};
use pipeline::{CounterCache, RateLimiter};

use crate::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub(crate) analyzer: PolicyAnalyzer,
    pub(crate) limiter: Option<RateLimiter>,
    pub(crate) metrics: MetricsRecorder,
    pub(crate) config: Arc<ServerConfig>,
}

impl AppState {
    /// The limiter is built over `cache` only when `config` enables rate
    /// limiting.
    pub fn new(analyzer: PolicyAnalyzer, cache: Arc<dyn CounterCache>, config: ServerConfig) -> Self {
        let limiter = config
            .rate_limit()
            .map(|limits| RateLimiter::new(cache, limits));
        Self {
            analyzer,
            limiter,
            metrics: MetricsRecorder,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
