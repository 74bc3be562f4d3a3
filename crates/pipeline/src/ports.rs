//! Port traits implemented by infrastructure crates.
//!
//! The domain states *what* it needs here; `llm` and `listener` supply the
//! *how*. All traits are object-safe so they can be injected as `Arc<dyn _>`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{CacheError, ExternalServiceError, PromptMessage, RequestSummary, ToolSchema};

// ---------------------------------------------------------------------------
// LLM provider
// ---------------------------------------------------------------------------

/// A chat-completion backend that answers through a forced tool call.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Identifier of the model requests are sent to.
    fn model_name(&self) -> &str;

    /// Sends `messages` with `tool` as the only permitted answer shape and
    /// returns the decoded tool-call arguments.
    ///
    /// Implementations own their retry policy; an error means the retry
    /// budget is spent.
    async fn run(
        &self,
        messages: &[PromptMessage],
        tool: &ToolSchema,
    ) -> Result<Map<String, Value>, ExternalServiceError>;
}

// ---------------------------------------------------------------------------
// Lifecycle events
// ---------------------------------------------------------------------------

/// Receives the lifecycle events of one analysis run, in order:
///
/// 1. [`request_received`](Self::request_received)
/// 2. [`llm_call_started`](Self::llm_call_started)
/// 3. [`llm_call_succeeded`](Self::llm_call_succeeded) or
///    [`llm_call_failed`](Self::llm_call_failed)
///
/// Implementations must not block; they are called inline on the request task.
pub trait AnalysisObserver: Send + Sync {
    /// The request was accepted for analysis. The summary excludes the policy
    /// text.
    fn request_received(&self, summary: &RequestSummary);

    /// The provider is about to be called with `model`.
    fn llm_call_started(&self, model: &str);

    /// The provider returned structured arguments.
    fn llm_call_succeeded(&self);

    /// The run failed; `message` is the rendered cause.
    fn llm_call_failed(&self, message: &str);
}

// ---------------------------------------------------------------------------
// Counter cache
// ---------------------------------------------------------------------------

/// A counter read from a [`CounterCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterEntry {
    /// Current value.
    pub count: u64,
    /// Time left before the entry expires.
    pub expires_in: Duration,
}

/// Shared expiring key-value store holding rate-limit counters.
///
/// The two operations are independent; callers that combine them get no
/// atomicity guarantee.
#[async_trait]
pub trait CounterCache: Send + Sync {
    /// Returns the live entry for `key`, or stores `initial` with a lifetime of
    /// `ttl` and returns that when the key is absent or expired.
    async fn get_or_insert(
        &self,
        key: &str,
        initial: u64,
        ttl: Duration,
    ) -> Result<CounterEntry, CacheError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
