//! The analysis orchestrator.
//!
//! [`PolicyAnalyzer::analyze`] runs one request through a fixed sequence:
//!
//! 1. observe the request summary (never the policy text)
//! 2. build the prompt messages
//! 3. build the tool schema
//! 4. observe the model name
//! 5. call the LLM provider
//! 6. observe success
//! 7. normalize the arguments into an [`AnalysisResult`]
//!
//! A failure at any step is observed once and wrapped into
//! [`PolicyAnalysisError`].

use std::sync::Arc;

use pipeline::{
    build_messages, normalize, policy_analysis_tool, AnalysisObserver, AnalysisRequest,
    AnalysisResult, LlmProvider, PolicyAnalysisError,
};

/// Composes prompt construction, the provider call and normalization into one
/// operation.
#[derive(Clone)]
pub struct PolicyAnalyzer {
    provider: Arc<dyn LlmProvider>,
    observer: Arc<dyn AnalysisObserver>,
}

impl PolicyAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>, observer: Arc<dyn AnalysisObserver>) -> Self {
        Self { provider, observer }
    }

    /// Model the provider sends requests to.
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Analyses one policy document.
    #[tracing::instrument(name = "analyze_policy", skip_all)]
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, PolicyAnalysisError> {
        self.observer.request_received(&request.summary());

        let messages = build_messages(request);
        let tool = policy_analysis_tool();

        self.observer.llm_call_started(self.provider.model_name());

        match self.provider.run(&messages, &tool).await {
            Ok(arguments) => {
                self.observer.llm_call_succeeded();
                Ok(normalize(&arguments))
            }
            Err(error) => {
                self.observer.llm_call_failed(&error.to_string());
                Err(PolicyAnalysisError::new(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    use pipeline::{
        ExternalServiceError, Jurisdiction, LlmCallFailure, MessageRole, PromptMessage,
        RequestSummary, ToolSchema,
    };

    use super::*;

    type Journal = Arc<Mutex<Vec<String>>>;

    struct RecordingObserver {
        journal: Journal,
        summaries: Mutex<Vec<RequestSummary>>,
    }

    impl AnalysisObserver for RecordingObserver {
        fn request_received(&self, summary: &RequestSummary) {
            self.summaries.lock().unwrap().push(summary.clone());
            self.journal.lock().unwrap().push("request_received".into());
        }

        fn llm_call_started(&self, model: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("llm_call_started:{model}"));
        }

        fn llm_call_succeeded(&self) {
            self.journal.lock().unwrap().push("llm_call_succeeded".into());
        }

        fn llm_call_failed(&self, message: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("llm_call_failed:{message}"));
        }
    }

    struct FakeProvider {
        journal: Journal,
        reply: Result<Map<String, Value>, ExternalServiceError>,
        seen: Mutex<Vec<(Vec<PromptMessage>, ToolSchema)>>,
    }

    #[async_trait]
    impl LlmProvider for FakeProvider {
        fn model_name(&self) -> &str {
            "gpt-test"
        }

        async fn run(
            &self,
            messages: &[PromptMessage],
            tool: &ToolSchema,
        ) -> Result<Map<String, Value>, ExternalServiceError> {
            self.journal.lock().unwrap().push("provider.run".into());
            self.seen
                .lock()
                .unwrap()
                .push((messages.to_vec(), tool.clone()));
            self.reply.clone()
        }
    }

    struct Harness {
        journal: Journal,
        observer: Arc<RecordingObserver>,
        provider: Arc<FakeProvider>,
        analyzer: PolicyAnalyzer,
    }

    fn harness(reply: Result<Map<String, Value>, ExternalServiceError>) -> Harness {
        let journal: Journal = Arc::default();
        let observer = Arc::new(RecordingObserver {
            journal: journal.clone(),
            summaries: Mutex::default(),
        });
        let provider = Arc::new(FakeProvider {
            journal: journal.clone(),
            reply,
            seen: Mutex::default(),
        });
        let analyzer = PolicyAnalyzer::new(provider.clone(), observer.clone());
        Harness {
            journal,
            observer,
            provider,
            analyzer,
        }
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::new("Comprehensive health insurance with a $500 deductible.")
            .unwrap()
            .with_policy_type("health")
            .with_jurisdiction(Jurisdiction::Us)
    }

    fn arguments() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "coverage": {"coverageType": "health", "coverageAmount": "$10,000"},
            "deductibles": [{"type": "annual", "amount": "$500"}],
            "exclusions": ["Cosmetic procedures"],
            "flags": {"needsLegalReview": false, "inconsistentClausesDetected": true}
        }) else {
            unreachable!()
        };
        map
    }

    fn exhausted_on_429() -> ExternalServiceError {
        ExternalServiceError::new(3, LlmCallFailure::UnexpectedStatus { status: 429 })
    }

    #[tokio::test]
    async fn successful_run_emits_events_in_order() {
        let h = harness(Ok(arguments()));

        h.analyzer.analyze(&request()).await.unwrap();

        assert_eq!(
            *h.journal.lock().unwrap(),
            vec![
                "request_received",
                "llm_call_started:gpt-test",
                "provider.run",
                "llm_call_succeeded",
            ]
        );
    }

    #[tokio::test]
    async fn successful_run_returns_normalized_result() {
        let h = harness(Ok(arguments()));

        let result = h.analyzer.analyze(&request()).await.unwrap();

        assert_eq!(result.coverage.coverage_type, "health");
        assert_eq!(result.exclusions, vec!["Cosmetic procedures"]);
        assert_eq!(result.risk_level.as_str(), "medium");
        assert!(result.required_actions.is_empty());
        assert!(result.flags.inconsistent_clauses_detected);
    }

    #[tokio::test]
    async fn provider_receives_built_messages_and_tool() {
        let h = harness(Ok(arguments()));
        let request = request();

        h.analyzer.analyze(&request).await.unwrap();

        let seen = h.provider.seen.lock().unwrap();
        let (messages, tool) = &seen[0];
        assert_eq!(messages, &build_messages(&request));
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(tool, &policy_analysis_tool());
    }

    #[tokio::test]
    async fn observed_summary_excludes_policy_text() {
        let h = harness(Ok(arguments()));

        h.analyzer.analyze(&request()).await.unwrap();

        let summaries = h.observer.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].policy_type.as_deref(), Some("health"));
        assert_eq!(summaries[0].jurisdiction, Some(Jurisdiction::Us));
        let rendered = serde_json::to_string(&summaries[0]).unwrap();
        assert!(!rendered.contains("deductible."));
    }

    #[tokio::test]
    async fn provider_failure_is_wrapped_with_cause_preserved() {
        let h = harness(Err(exhausted_on_429()));

        let error = h.analyzer.analyze(&request()).await.unwrap_err();

        assert_eq!(error.to_string(), "Failed to analyze insurance policy.");
        assert_eq!(error.cause(), &exhausted_on_429());
    }

    #[tokio::test]
    async fn failed_run_emits_failure_event_after_provider_call() {
        let h = harness(Err(exhausted_on_429()));

        let _ = h.analyzer.analyze(&request()).await;

        let journal = h.journal.lock().unwrap();
        assert_eq!(journal.len(), 4);
        assert_eq!(journal[0], "request_received");
        assert_eq!(journal[1], "llm_call_started:gpt-test");
        assert_eq!(journal[2], "provider.run");
        assert!(journal[3].starts_with("llm_call_failed:"));
        assert!(journal[3].contains("429"));
        assert!(!journal.iter().any(|e| e == "llm_call_succeeded"));
    }
}
