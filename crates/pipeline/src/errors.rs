//! Error types for the policy analysis domain.
//!
//! Each boundary exposes one closed error type and converts at the crossing:
//!
//! | Boundary | Error |
//! |----------|-------|
//! | single LLM attempt | [`LlmCallFailure`] |
//! | LLM provider port | [`ExternalServiceError`] |
//! | analysis orchestrator | [`PolicyAnalysisError`] |
//! | rate limiter | [`RateLimitError`] |
//! | counter cache port | [`CacheError`] |
//!
//! Transport-specific error types (HTTP client, JSON parser) never appear in
//! these types; adapters render them into messages at the boundary.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// LLM call failures
// ---------------------------------------------------------------------------

/// Why a single attempt against the LLM provider failed.
///
/// Every variant is treated the same by the retry loop: the attempt is
/// retried until the budget is spent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmCallFailure {
    /// The request never produced an HTTP response (connect error, timeout,
    /// body read failure).
    #[error("transport failure: {message}")]
    Transport {
        /// Rendered transport error.
        message: String,
    },

    /// The provider answered with a status other than 200.
    #[error("provider returned non-200 status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The response body did not have the expected tool-call structure, or the
    /// decoded arguments were not a JSON object.
    #[error("unexpected response structure: {reason}")]
    MalformedResponse {
        /// What was missing or wrong.
        reason: String,
    },

    /// The tool-call arguments string was not valid JSON.
    #[error("tool call arguments are not valid JSON: {message}")]
    InvalidArguments {
        /// Rendered decoder error.
        message: String,
    },
}

/// An LLM provider call that failed after exhausting its retry budget.
///
/// Carries the failure of the final attempt as its source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("LLM request failed after {attempts} attempt(s): {last_failure}")]
pub struct ExternalServiceError {
    attempts: u32,
    #[source]
    last_failure: LlmCallFailure,
}

impl ExternalServiceError {
    /// Creates the error from the number of attempts made and the failure of
    /// the last one.
    pub fn new(attempts: u32, last_failure: LlmCallFailure) -> Self {
        Self {
            attempts,
            last_failure,
        }
    }

    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Failure of the final attempt.
    pub fn last_failure(&self) -> &LlmCallFailure {
        &self.last_failure
    }
}

// ---------------------------------------------------------------------------
// Orchestrator failure
// ---------------------------------------------------------------------------

/// The single failure kind surfaced by the analysis orchestrator.
///
/// Its message is deliberately generic and safe to show to callers; the
/// underlying cause is kept for diagnostics only.
#[derive(Debug, Error)]
#[error("Failed to analyze insurance policy.")]
pub struct PolicyAnalysisError {
    #[source]
    source: ExternalServiceError,
}

impl PolicyAnalysisError {
    /// Wraps a provider failure that ended the analysis.
    pub fn new(source: ExternalServiceError) -> Self {
        Self { source }
    }

    /// The failure that caused the analysis to fail.
    pub fn cause(&self) -> &ExternalServiceError {
        &self.source
    }
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

/// A counter cache backend failed to read, write, or delete an entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("counter cache operation failed: {message}")]
pub struct CacheError {
    message: String,
}

impl CacheError {
    /// Creates the error from a backend-specific description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome of a rejected rate-limit check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// The client used up its allowance for the current window.
    #[error("Rate limit exceeded. Try again later.")]
    Exceeded {
        /// Time until the client's counter expires.
        retry_after: Duration,
    },

    /// The counter could not be read or updated.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Runtime configuration is invalid.
///
/// Produced at start-up; the service never starts with an invalid config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration error: {message}")]
pub struct ConfigurationError {
    message: String,
}

impl ConfigurationError {
    /// Creates the error from a message naming the offending setting.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message without the `Configuration error:` prefix.
    pub fn message(&self) -> &str {
        &self.message
    }
}
