//! Core domain for PolicyLens.
//!
//! This crate contains every domain concept, newtype identifier, value type,
//! error type and port trait used by the analysis pipeline, together with the
//! pure parts of the pipeline itself (prompt construction, tool schema,
//! response normalization, rate-limit algorithm). Infrastructure crates
//! implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`CorrelationId`, `ClientKey`) |
//! | [`types`] | Request and result value types |
//! | [`errors`] | One error type per boundary |
//! | [`ports`] | `LlmProvider`, `AnalysisObserver`, `CounterCache` |
//! | [`prompt`] | Chat message construction |
//! | [`schema`] | Tool schema forcing structured output |
//! | [`normalizer`] | Raw tool arguments → `AnalysisResult` |
//! | [`rate_limit`] | Fixed-window limiter over `CounterCache` |

pub mod errors;
pub mod identifiers;
pub mod normalizer;
pub mod ports;
pub mod prompt;
pub mod rate_limit;
pub mod schema;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{
    CacheError, ConfigurationError, ExternalServiceError, LlmCallFailure, PolicyAnalysisError,
    RateLimitError,
};
pub use identifiers::{ClientKey, CorrelationId};
pub use normalizer::normalize;
pub use ports::{AnalysisObserver, CounterCache, CounterEntry, LlmProvider};
pub use prompt::{build_messages, MessageRole, PromptMessage};
pub use rate_limit::{cache_key, Admission, RateLimitConfig, RateLimiter};
pub use schema::{policy_analysis_tool, FunctionSchema, ToolSchema, POLICY_ANALYSIS_TOOL};
pub use types::{
    AnalysisRequest, AnalysisResult, Coverage, CoverageBreakdown, Flags, Jurisdiction,
    RequestSummary, RiskLevel, DEFAULT_LANGUAGE, MAX_POLICY_TYPE_CHARS,
};
