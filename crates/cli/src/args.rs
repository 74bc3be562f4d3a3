//! Command-line and environment configuration.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};

use listener::{ContactInfo, ServerConfig};
use llm::{OpenAiClientConfig, OpenAiModelConfig};
use pipeline::{ConfigurationError, RateLimitConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Insurance policy analysis service.
#[derive(Debug, Parser)]
#[command(name = "policylens", version, about)]
pub struct Args {
    /// Address the HTTP server binds to.
    #[arg(long, env = "POLICYLENS_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Chat-completions endpoint.
    #[arg(long, env = "OPENAI_ENDPOINT", default_value = OpenAiClientConfig::DEFAULT_ENDPOINT)]
    pub openai_endpoint: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = OpenAiModelConfig::DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "OPENAI_TEMPERATURE", default_value_t = OpenAiModelConfig::DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    #[arg(long, env = "OPENAI_MAX_TOKENS", default_value_t = OpenAiModelConfig::DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    /// Per-attempt HTTP timeout for LLM calls, in milliseconds.
    #[arg(long, env = "POLICYLENS_LLM_TIMEOUT_MS", default_value_t = 25_000)]
    pub llm_timeout_ms: u64,

    #[arg(long, env = "POLICYLENS_LLM_MAX_RETRIES", default_value_t = OpenAiClientConfig::DEFAULT_MAX_RETRIES)]
    pub llm_max_retries: u32,

    #[arg(long, env = "POLICYLENS_LLM_RETRY_DELAY_MS", default_value_t = 150)]
    pub llm_retry_delay_ms: u64,

    /// Deadline imposed by the hosting environment on one request, in
    /// milliseconds. The LLM timeout must be shorter.
    #[arg(long, env = "POLICYLENS_INVOCATION_DEADLINE_MS", default_value_t = 29_000)]
    pub invocation_deadline_ms: u64,

    /// Requests admitted per client within one window.
    #[arg(long, env = "POLICYLENS_RATE_LIMIT_MAX", default_value_t = RateLimitConfig::DEFAULT_MAX_REQUESTS)]
    pub rate_limit_max: u64,

    #[arg(long, env = "POLICYLENS_RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    #[arg(long, env = "POLICYLENS_DISABLE_RATE_LIMIT")]
    pub disable_rate_limit: bool,

    /// Shared secret required in `X-Demo-Password`. Unset disables the gate.
    #[arg(long, env = "POLICYLENS_DEMO_PASSWORD", hide_env_values = true)]
    pub demo_password: Option<String>,

    /// Contact email returned to callers rejected by the password gate.
    #[arg(long, env = "POLICYLENS_CONTACT_EMAIL")]
    pub contact_email: Option<String>,

    #[arg(long, env = "POLICYLENS_CONTACT_URL")]
    pub contact_url: Option<String>,

    /// Comma-separated proxy addresses whose `X-Forwarded-For` is trusted.
    #[arg(long, env = "POLICYLENS_TRUSTED_PROXIES", value_delimiter = ',')]
    pub trusted_proxies: Vec<IpAddr>,

    #[arg(long, env = "POLICYLENS_LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for span export. Unset disables export.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Args {
    pub fn invocation_deadline(&self) -> Duration {
        Duration::from_millis(self.invocation_deadline_ms)
    }

    pub fn client_config(&self) -> Result<OpenAiClientConfig, ConfigurationError> {
        Ok(OpenAiClientConfig::new(self.openai_api_key.as_str())?
            .with_endpoint(self.openai_endpoint.as_str())
            .with_timeout(Duration::from_millis(self.llm_timeout_ms))
            .with_max_retries(self.llm_max_retries)
            .with_retry_delay(Duration::from_millis(self.llm_retry_delay_ms)))
    }

    pub fn model_config(&self) -> Result<OpenAiModelConfig, ConfigurationError> {
        OpenAiModelConfig::new(self.model.as_str(), self.temperature, self.max_tokens)
    }

    pub fn server_config(&self) -> Result<ServerConfig, ConfigurationError> {
        let mut config = ServerConfig::new()
            .with_contact(ContactInfo {
                email: self.contact_email.clone(),
                url: self.contact_url.clone(),
            })
            .with_trusted_proxies(self.trusted_proxies.clone());

        config = if self.disable_rate_limit {
            config.without_rate_limit()
        } else {
            config.with_rate_limit(RateLimitConfig::new(
                self.rate_limit_max,
                Duration::from_secs(self.rate_limit_window_secs),
            )?)
        };

        if let Some(password) = &self.demo_password {
            config = config.with_demo_password(password.as_str());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["policylens", "--openai-api-key", "sk-test"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_component_defaults() {
        let args = parse(&[]);

        assert_eq!(args.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(args.model_config().unwrap(), OpenAiModelConfig::default());

        let client = args.client_config().unwrap();
        assert_eq!(client.timeout(), OpenAiClientConfig::DEFAULT_TIMEOUT);
        assert_eq!(client.max_retries(), OpenAiClientConfig::DEFAULT_MAX_RETRIES);
        assert_eq!(client.retry_delay(), OpenAiClientConfig::DEFAULT_RETRY_DELAY);
        assert!(client.validate(args.invocation_deadline()).is_ok());

        let server = args.server_config().unwrap();
        assert_eq!(server.rate_limit(), Some(RateLimitConfig::default()));
        assert_eq!(server.demo_password(), None);
    }

    #[test]
    fn timeout_beyond_deadline_fails_validation() {
        let args = parse(&["--llm-timeout-ms", "30000"]);

        assert!(args
            .client_config()
            .unwrap()
            .validate(args.invocation_deadline())
            .is_err());
    }

    #[test]
    fn rate_limit_can_be_tuned_or_disabled() {
        let tuned = parse(&["--rate-limit-max", "10", "--rate-limit-window-secs", "30"]);
        let limits = tuned.server_config().unwrap().rate_limit().unwrap();
        assert_eq!(limits.max_requests(), 10);
        assert_eq!(limits.window(), Duration::from_secs(30));

        let disabled = parse(&["--disable-rate-limit"]);
        assert_eq!(disabled.server_config().unwrap().rate_limit(), None);
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        assert!(parse(&["--rate-limit-max", "0"]).server_config().is_err());
    }

    #[test]
    fn trusted_proxies_are_comma_separated() {
        let args = parse(&["--trusted-proxies", "10.0.0.1,10.0.0.2"]);

        assert_eq!(
            args.server_config().unwrap().trusted_proxies(),
            &["10.0.0.1".parse::<IpAddr>().unwrap(), "10.0.0.2".parse().unwrap()]
        );
    }

    #[test]
    fn demo_password_and_contact_are_passed_through() {
        let args = parse(&[
            "--demo-password",
            "open-sesame",
            "--contact-email",
            "ops@example.com",
        ]);
        let server = args.server_config().unwrap();

        assert_eq!(server.demo_password(), Some("open-sesame"));
        assert_eq!(server.contact().email.as_deref(), Some("ops@example.com"));
        assert_eq!(server.contact().url, None);
    }

    #[test]
    fn pretty_log_format_is_accepted() {
        assert_eq!(parse(&["--log-format", "pretty"]).log_format, LogFormat::Pretty);
    }
}
