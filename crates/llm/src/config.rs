//! Model and transport configuration for [`crate::OpenAiClient`].

use std::fmt;
use std::time::Duration;

use pipeline::ConfigurationError;

/// Hard limit on one hosted invocation. Every per-call timeout must finish
/// strictly before it.
pub const DEFAULT_INVOCATION_DEADLINE: Duration = Duration::from_secs(29);

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiModelConfig {
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiModelConfig {
    pub const DEFAULT_MODEL: &'static str = "gpt-4.1-mini";
    pub const DEFAULT_TEMPERATURE: f64 = 0.1;
    pub const DEFAULT_MAX_TOKENS: u32 = 2000;

    pub fn new(
        model: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<Self, ConfigurationError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(ConfigurationError::new("model name must not be empty"));
        }
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigurationError::new(format!(
                "temperature must be between 0 and 2, got {temperature}"
            )));
        }
        if max_tokens == 0 {
            return Err(ConfigurationError::new("max_tokens must be at least 1"));
        }
        Ok(Self {
            model,
            temperature,
            max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

impl Default for OpenAiModelConfig {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Endpoint, credentials and retry budget.
///
/// `Debug` output never includes the API key.
#[derive(Clone)]
pub struct OpenAiClientConfig {
    api_key: String,
    endpoint: String,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiClientConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.openai.com/v1/chat/completions";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);
    pub const DEFAULT_MAX_RETRIES: u32 = 2;
    pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(150);

    /// Creates a config with default endpoint, timeout and retry budget.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigurationError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigurationError::new(
                "OpenAI API key is required. Set OPENAI_API_KEY.",
            ));
        }
        Ok(Self {
            api_key,
            endpoint: Self::DEFAULT_ENDPOINT.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_delay: Self::DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts per call: the first one plus every retry.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Worst-case wall time of one call when every attempt times out.
    pub fn worst_case_duration(&self) -> Duration {
        (self.timeout + self.retry_delay) * self.max_attempts()
    }

    /// Checks the timeout against the hosting invocation `deadline`.
    ///
    /// A timeout at or beyond the deadline is rejected. A retry budget whose
    /// worst case overruns the deadline is allowed with a warning; later
    /// attempts are cut off by the host in that case.
    pub fn validate(&self, deadline: Duration) -> Result<(), ConfigurationError> {
        if self.timeout.is_zero() {
            return Err(ConfigurationError::new("LLM timeout must be longer than zero"));
        }
        if self.timeout >= deadline {
            return Err(ConfigurationError::new(format!(
                "LLM timeout ({}ms) must be shorter than the invocation deadline ({}ms)",
                self.timeout.as_millis(),
                deadline.as_millis()
            )));
        }
        if reqwest::Url::parse(&self.endpoint).is_err() {
            return Err(ConfigurationError::new(format!(
                "LLM endpoint is not a valid URL: {}",
                self.endpoint
            )));
        }

        let worst_case = self.worst_case_duration();
        if worst_case > deadline {
            tracing::warn!(
                worst_case_ms = worst_case.as_millis() as u64,
                deadline_ms = deadline.as_millis() as u64,
                attempts = self.max_attempts(),
                "LLM retry budget can exceed the invocation deadline"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for OpenAiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiClientConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}
