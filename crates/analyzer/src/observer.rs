//! Default [`AnalysisObserver`]: lifecycle events as `tracing` records.

use pipeline::{AnalysisObserver, RequestSummary};

/// Emits one structured log event per lifecycle step.
///
/// Events are recorded inside whatever span is current, so the request span
/// opened by the HTTP layer contributes its `correlation_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AnalysisObserver for TracingObserver {
    fn request_received(&self, summary: &RequestSummary) {
        let metadata = summary
            .metadata
            .as_ref()
            .map(|m| serde_json::Value::Object(m.clone()).to_string());
        tracing::info!(
            policy_type = summary.policy_type.as_deref(),
            jurisdiction = summary.jurisdiction.map(|j| j.as_str()),
            language = %summary.language,
            metadata = metadata.as_deref(),
            "Incoming policy analysis request"
        );
    }

    fn llm_call_started(&self, model: &str) {
        tracing::info!(model, "Calling LLM model");
    }

    fn llm_call_succeeded(&self) {
        tracing::info!("LLM call succeeded");
    }

    fn llm_call_failed(&self, message: &str) {
        tracing::error!(error = message, "LLM call failed");
    }
}
