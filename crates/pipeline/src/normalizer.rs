//! Mapping of the model's raw tool-call arguments into an [`AnalysisResult`].
//!
//! [`normalize`] is total: it accepts any JSON object and always returns a
//! complete result. Missing or wrongly-typed fields fall back to their zero
//! value (empty string, empty list, `false`), except `riskLevel`, which falls
//! back to `"medium"`. Values are not checked against the schema's enums.
//!
//! Wrong-typed values are handled as follows:
//!
//! | Position | Accepted | Otherwise |
//! |----------|----------|-----------|
//! | text field | string; number/bool rendered as JSON text | `""` |
//! | list of text | array; unrenderable items skipped | `[]` |
//! | breakdown | array of objects; other items skipped | `[]` |
//! | deductibles | array, items kept verbatim | `[]` |
//! | flag | bool | `false` |
//! | risk level | string, kept verbatim | `"medium"` |

use serde_json::{Map, Value};

use crate::{AnalysisResult, Coverage, CoverageBreakdown, Flags, RiskLevel};

/// Builds an [`AnalysisResult`] from the decoded tool-call arguments.
pub fn normalize(raw: &Map<String, Value>) -> AnalysisResult {
    let coverage = raw.get("coverage");
    let flags = raw.get("flags");

    AnalysisResult {
        coverage: Coverage {
            coverage_type: text(field(coverage, "coverageType")).unwrap_or_default(),
            coverage_amount: text(field(coverage, "coverageAmount")).unwrap_or_default(),
            coverage_breakdown: breakdown(field(coverage, "coverageBreakdown")),
        },
        deductibles: raw
            .get("deductibles")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        exclusions: text_list(raw.get("exclusions")),
        risk_level: raw
            .get("riskLevel")
            .and_then(Value::as_str)
            .map(RiskLevel::new)
            .unwrap_or_default(),
        required_actions: text_list(raw.get("requiredActions")),
        flags: Flags {
            needs_legal_review: flag(field(flags, "needsLegalReview")),
            inconsistent_clauses_detected: flag(field(flags, "inconsistentClausesDetected")),
        },
    }
}

fn field<'a>(parent: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    parent.and_then(|p| p.get(name))
}

fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(|item| text(Some(item))).collect())
        .unwrap_or_default()
}

fn flag(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

fn breakdown(value: Option<&Value>) -> Vec<CoverageBreakdown> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| CoverageBreakdown {
            category: text(item.get("category")).unwrap_or_default(),
            limit: text(item.get("limit")).unwrap_or_default(),
        })
        .collect()
}
