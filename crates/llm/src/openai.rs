//! OpenAI chat-completions client.
//!
//! One call sends a single POST per attempt with the tool forced through
//! `tool_choice`, and reads the answer from
//! `choices[0].message.tool_calls[0].function.arguments`. Every failure class
//! (transport, non-200 status, unexpected structure, undecodable arguments)
//! is retried after a fixed delay until the attempt budget is spent. Decoded
//! arguments are returned as-is; absent sections are defaulted downstream by
//! the normalizer.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use pipeline::{
    ConfigurationError, ExternalServiceError, LlmCallFailure, LlmProvider, PromptMessage,
    ToolSchema,
};

use crate::{OpenAiClientConfig, OpenAiModelConfig};

const ARGUMENTS_POINTER: &str = "/choices/0/message/tool_calls/0/function/arguments";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    tools: [&'a ToolSchema; 1],
    tool_choice: ToolChoice<'a>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolChoiceFunction<'a>,
}

#[derive(Serialize)]
struct ToolChoiceFunction<'a> {
    name: &'a str,
}

/// [`LlmProvider`] backed by the OpenAI chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    config: OpenAiClientConfig,
    model: OpenAiModelConfig,
}

impl OpenAiClient {
    pub fn new(
        config: OpenAiClientConfig,
        model: OpenAiModelConfig,
    ) -> Result<Self, ConfigurationError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigurationError::new(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            model,
        })
    }

    pub fn config(&self) -> &OpenAiClientConfig {
        &self.config
    }

    /// One request/response cycle, without retries.
    async fn attempt(
        &self,
        request: &ChatRequest<'_>,
    ) -> Result<Map<String, Value>, LlmCallFailure> {
        let response = self
            .http
            .post(self.config.endpoint())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key()),
            )
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LlmCallFailure::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        parse_arguments(&body)
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    fn model_name(&self) -> &str {
        self.model.model()
    }

    async fn run(
        &self,
        messages: &[PromptMessage],
        tool: &ToolSchema,
    ) -> Result<Map<String, Value>, ExternalServiceError> {
        let request = ChatRequest {
            model: self.model.model(),
            messages,
            tools: [tool],
            tool_choice: ToolChoice {
                kind: "function",
                function: ToolChoiceFunction { name: tool.name() },
            },
            temperature: self.model.temperature(),
            max_tokens: self.model.max_tokens(),
        };

        let max_attempts = self.config.max_attempts();
        let mut attempt = 1;
        loop {
            match self.attempt(&request).await {
                Ok(arguments) => return Ok(arguments),
                Err(failure) if attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %failure,
                        "LLM request failed, retrying"
                    );
                    tokio::time::sleep(self.config.retry_delay()).await;
                    attempt += 1;
                }
                Err(failure) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %failure,
                        "LLM request failed, retry budget exhausted"
                    );
                    return Err(ExternalServiceError::new(attempt, failure));
                }
            }
        }
    }
}

fn transport(error: reqwest::Error) -> LlmCallFailure {
    LlmCallFailure::Transport {
        message: error.to_string(),
    }
}

/// Extracts and decodes the tool-call arguments from a 200 response body.
fn parse_arguments(body: &str) -> Result<Map<String, Value>, LlmCallFailure> {
    let envelope: Value =
        serde_json::from_str(body).map_err(|e| LlmCallFailure::MalformedResponse {
            reason: format!("response body is not JSON: {e}"),
        })?;

    let raw = envelope
        .pointer(ARGUMENTS_POINTER)
        .and_then(Value::as_str)
        .ok_or_else(|| LlmCallFailure::MalformedResponse {
            reason: "missing choices[0].message.tool_calls[0].function.arguments".to_string(),
        })?;

    let decoded: Value =
        serde_json::from_str(raw).map_err(|e| LlmCallFailure::InvalidArguments {
            message: e.to_string(),
        })?;

    match decoded {
        Value::Object(arguments) => Ok(arguments),
        _ => Err(LlmCallFailure::MalformedResponse {
            reason: "tool call arguments are not a JSON object".to_string(),
        }),
    }
}
