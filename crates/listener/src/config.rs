//! HTTP surface configuration.

use std::fmt;
use std::net::IpAddr;

use pipeline::{ConfigurationError, RateLimitConfig};
use serde::Serialize;

/// Contact details returned to callers rejected by the demo password gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Settings for the middleware stack.
///
/// `Debug` output never includes the demo password.
#[derive(Clone)]
pub struct ServerConfig {
    rate_limit: Option<RateLimitConfig>,
    demo_password: Option<String>,
    contact: ContactInfo,
    trusted_proxies: Vec<IpAddr>,
}

impl ServerConfig {
    /// Rate limiting with default limits, no password gate, no trusted proxies.
    pub fn new() -> Self {
        Self {
            rate_limit: Some(RateLimitConfig::default()),
            demo_password: None,
            contact: ContactInfo::default(),
            trusted_proxies: Vec::new(),
        }
    }

    pub fn with_rate_limit(mut self, limits: RateLimitConfig) -> Self {
        self.rate_limit = Some(limits);
        self
    }

    /// Admits every request without touching the counter cache.
    pub fn without_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }

    pub fn with_demo_password(mut self, password: impl Into<String>) -> Self {
        self.demo_password = Some(password.into());
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    /// Peers whose `X-Forwarded-For` header is trusted.
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = proxies;
        self
    }

    /// `None` when rate limiting is disabled.
    pub fn rate_limit(&self) -> Option<RateLimitConfig> {
        self.rate_limit
    }

    /// `None` when the password gate is disabled.
    pub fn demo_password(&self) -> Option<&str> {
        self.demo_password.as_deref()
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if matches!(self.demo_password.as_deref(), Some(p) if p.is_empty()) {
            return Err(ConfigurationError::new(
                "demo password must not be empty; omit it to disable the gate",
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("rate_limit", &self.rate_limit)
            .field(
                "demo_password",
                &self.demo_password.as_ref().map(|_| "<redacted>"),
            )
            .field("contact", &self.contact)
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_rate_limiting_only() {
        let config = ServerConfig::default();

        assert_eq!(config.rate_limit(), Some(RateLimitConfig::default()));
        assert_eq!(config.demo_password(), None);
        assert!(config.trusted_proxies().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rate_limiting_can_be_disabled() {
        assert_eq!(ServerConfig::new().without_rate_limit().rate_limit(), None);
    }

    #[test]
    fn empty_demo_password_is_rejected() {
        assert!(ServerConfig::new().with_demo_password("").validate().is_err());
        assert!(ServerConfig::new()
            .with_demo_password("open-sesame")
            .validate()
            .is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let rendered = format!("{:?}", ServerConfig::new().with_demo_password("open-sesame"));

        assert!(!rendered.contains("open-sesame"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn contact_omits_unset_fields() {
        let contact = ContactInfo {
            email: Some("ops@example.com".into()),
            url: None,
        };

        assert_eq!(
            serde_json::to_value(&contact).unwrap(),
            serde_json::json!({"email": "ops@example.com"})
        );
    }
}
