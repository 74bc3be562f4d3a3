//! PolicyLens analysis orchestration.
//!
//! This crate drives one analysis run from a validated
//! [`pipeline::AnalysisRequest`] to a normalized [`pipeline::AnalysisResult`],
//! and provides the default [`pipeline::AnalysisObserver`] that turns
//! lifecycle events into structured log records.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** [`PolicyAnalyzer`] sequences calls between the pure
//! stages in the [`pipeline`] crate and the injected
//! [`pipeline::LlmProvider`]. It contains no domain rules of its own and
//! performs no I/O itself.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`orchestrator`] | `PolicyAnalyzer` |
//! | [`observer`] | `TracingObserver` |
//! | [`metrics`] | `MetricsRecorder` |

pub mod metrics;
pub mod observer;
pub mod orchestrator;

pub use metrics::MetricsRecorder;
pub use observer::TracingObserver;
pub use orchestrator::PolicyAnalyzer;
