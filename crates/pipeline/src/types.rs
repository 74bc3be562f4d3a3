//! Shared value types for the policy analysis domain.
//!
//! [`AnalysisRequest`] is the validated input of one analysis run and
//! [`AnalysisResult`] its normalized output. Wire names are camelCase to match
//! the public JSON contract of the `/analyze` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Language used when the caller does not request one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Maximum length of [`AnalysisRequest::policy_type`], in characters.
pub const MAX_POLICY_TYPE_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Request side
// ---------------------------------------------------------------------------

/// Legal jurisdiction the policy is analysed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Jurisdiction {
    /// Italy.
    It,
    /// European Union.
    Eu,
    /// United States.
    Us,
    /// United Kingdom.
    Uk,
    /// No specific jurisdiction.
    Global,
}

impl Jurisdiction {
    /// Every accepted jurisdiction, in the order they are listed to callers.
    pub const ALL: [Jurisdiction; 5] = [
        Jurisdiction::It,
        Jurisdiction::Eu,
        Jurisdiction::Us,
        Jurisdiction::Uk,
        Jurisdiction::Global,
    ];

    /// Parses the wire code. Matching is exact and case-sensitive.
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|j| j.as_str() == code)
    }

    /// Returns the wire code (e.g. `"EU"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Jurisdiction::It => "IT",
            Jurisdiction::Eu => "EU",
            Jurisdiction::Us => "US",
            Jurisdiction::Uk => "UK",
            Jurisdiction::Global => "GLOBAL",
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// A validated request to analyse one insurance policy document.
///
/// Construction goes through [`AnalysisRequest::new`] and the `with_*`
/// builders; once built the request is only read. Field-level checks (length,
/// enum membership) are performed by the inbound adapter before construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    policy_text: String,
    policy_type: Option<String>,
    jurisdiction: Option<Jurisdiction>,
    language: String,
    metadata: Option<Map<String, Value>>,
}

impl AnalysisRequest {
    /// Creates a request for `policy_text`.
    ///
    /// Returns `None` if the text is empty or whitespace only.
    pub fn new(policy_text: impl Into<String>) -> Option<Self> {
        let policy_text = policy_text.into();
        if policy_text.trim().is_empty() {
            return None;
        }
        Some(Self {
            policy_text,
            policy_type: None,
            jurisdiction: None,
            language: DEFAULT_LANGUAGE.to_string(),
            metadata: None,
        })
    }

    /// Sets the free-form policy type (e.g. `"auto"`, `"health"`).
    #[must_use]
    pub fn with_policy_type(mut self, policy_type: impl Into<String>) -> Self {
        self.policy_type = Some(policy_type.into());
        self
    }

    /// Sets the jurisdiction.
    #[must_use]
    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = Some(jurisdiction);
        self
    }

    /// Overrides the response language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Attaches opaque caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The raw policy document. Never logged.
    pub fn policy_text(&self) -> &str {
        &self.policy_text
    }

    pub fn policy_type(&self) -> Option<&str> {
        self.policy_type.as_deref()
    }

    pub fn jurisdiction(&self) -> Option<Jurisdiction> {
        self.jurisdiction
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    /// Returns everything about the request except the policy text, for
    /// logging.
    pub fn summary(&self) -> RequestSummary {
        RequestSummary {
            policy_type: self.policy_type.clone(),
            jurisdiction: self.jurisdiction,
            language: self.language.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// Loggable view of an [`AnalysisRequest`]: the request minus its policy text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    pub policy_type: Option<String>,
    pub jurisdiction: Option<Jurisdiction>,
    pub language: String,
    pub metadata: Option<Map<String, Value>>,
}

// ---------------------------------------------------------------------------
// Result side
// ---------------------------------------------------------------------------

/// Qualitative risk level reported by the model.
///
/// Recognised values are `low`, `medium` and `high`. Unrecognised strings from
/// a non-conformant model response are carried verbatim; enum enforcement
/// happens provider-side through the tool schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskLevel(String);

impl RiskLevel {
    pub const LOW: &'static str = "low";
    pub const MEDIUM: &'static str = "medium";
    pub const HIGH: &'static str = "high";

    /// Values accepted by the tool schema.
    pub const RECOGNISED: [&'static str; 3] = [Self::LOW, Self::MEDIUM, Self::HIGH];

    /// Wraps any string, recognised or not.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The conservative default used when the model omits a risk level.
    pub fn medium() -> Self {
        Self(Self::MEDIUM.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the value is one of [`RiskLevel::RECOGNISED`].
    pub fn is_recognised(&self) -> bool {
        Self::RECOGNISED.contains(&self.0.as_str())
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        Self::medium()
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of a per-category coverage breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageBreakdown {
    pub category: String,
    pub limit: String,
}

/// Overall coverage summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    /// High-level category, e.g. `"health"` or `"vehicle_liability"`.
    pub coverage_type: String,
    /// Human-readable main limit, including currency where known.
    pub coverage_amount: String,
    pub coverage_breakdown: Vec<CoverageBreakdown>,
}

/// Compliance and review flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    pub needs_legal_review: bool,
    pub inconsistent_clauses_detected: bool,
}

/// Structured risk assessment of one policy document.
///
/// Built once by the normalizer and handed to the caller unchanged. Every field
/// has a well-defined default, so a result is always complete even when the
/// model omitted sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub coverage: Coverage,
    /// Deductible records exactly as the model produced them.
    pub deductibles: Vec<Value>,
    pub exclusions: Vec<String>,
    pub risk_level: RiskLevel,
    pub required_actions: Vec<String>,
    pub flags: Flags,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            coverage: Coverage::default(),
            deductibles: Vec::new(),
            exclusions: Vec::new(),
            risk_level: RiskLevel::medium(),
            required_actions: Vec::new(),
            flags: Flags::default(),
        }
    }
}
