//! Request body decoding and field validation.
//!
//! The body is decoded to a JSON value first so that every field problem is
//! reported at once, rather than stopping at the first type mismatch.
//!
//! | Field | Rules |
//! |-------|-------|
//! | `policyText` | required, string, not blank |
//! | `policyType` | optional, string, at most 50 characters |
//! | `jurisdiction` | optional, one of `IT`, `EU`, `US`, `UK`, `GLOBAL` |
//! | `language` | optional, string, defaults to `en` |
//! | `metadata` | optional, object |
//!
//! `null` counts as absent for the optional fields. Unknown fields are ignored.

use serde_json::{Map, Value};

use pipeline::{AnalysisRequest, Jurisdiction, MAX_POLICY_TYPE_CHARS};

use crate::{ApiError, Violation};

const TYPE_STRING: &str = "This value should be of type string.";
const TYPE_OBJECT: &str = "This value should be of type object.";
const POLICY_TEXT_REQUIRED: &str = "policyText is required.";
const JURISDICTION_CHOICES: &str = "jurisdiction must be one of IT, EU, US, UK, GLOBAL.";

/// Decodes `body` and validates it into an [`AnalysisRequest`].
pub fn parse_request(body: &[u8]) -> Result<AnalysisRequest, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(ApiError::MalformedBody(
            "expected a JSON object".to_string(),
        ));
    };
    validate(&fields).map_err(ApiError::Validation)
}

/// Validates decoded fields, collecting every violation.
pub fn validate(fields: &Map<String, Value>) -> Result<AnalysisRequest, Vec<Violation>> {
    let mut violations = Vec::new();

    let policy_text = match fields.get("policyText") {
        None | Some(Value::Null) => {
            violations.push(Violation::new("policyText", POLICY_TEXT_REQUIRED));
            None
        }
        Some(Value::String(text)) => {
            let request = AnalysisRequest::new(text.as_str());
            if request.is_none() {
                violations.push(Violation::new("policyText", POLICY_TEXT_REQUIRED));
            }
            request
        }
        Some(_) => {
            violations.push(Violation::new("policyText", TYPE_STRING));
            None
        }
    };

    let policy_type = optional_string(fields, "policyType", &mut violations);
    if let Some(policy_type) = policy_type {
        if policy_type.chars().count() > MAX_POLICY_TYPE_CHARS {
            violations.push(Violation::new(
                "policyType",
                format!(
                    "This value is too long. It should have {MAX_POLICY_TYPE_CHARS} characters or less."
                ),
            ));
        }
    }

    let jurisdiction = match optional_string(fields, "jurisdiction", &mut violations) {
        Some(code) => {
            let parsed = Jurisdiction::parse(code);
            if parsed.is_none() {
                violations.push(Violation::new("jurisdiction", JURISDICTION_CHOICES));
            }
            parsed
        }
        None => None,
    };

    let language = optional_string(fields, "language", &mut violations);

    let metadata = match fields.get("metadata") {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.clone()),
        Some(_) => {
            violations.push(Violation::new("metadata", TYPE_OBJECT));
            None
        }
    };

    match policy_text {
        Some(mut request) if violations.is_empty() => {
            if let Some(policy_type) = policy_type {
                request = request.with_policy_type(policy_type);
            }
            if let Some(jurisdiction) = jurisdiction {
                request = request.with_jurisdiction(jurisdiction);
            }
            if let Some(language) = language {
                request = request.with_language(language);
            }
            if let Some(metadata) = metadata {
                request = request.with_metadata(metadata);
            }
            Ok(request)
        }
        _ => Err(violations),
    }
}

fn optional_string<'a>(
    fields: &'a Map<String, Value>,
    name: &str,
    violations: &mut Vec<Violation>,
) -> Option<&'a str> {
    match fields.get(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value.as_str()),
        Some(_) => {
            violations.push(Violation::new(name, TYPE_STRING));
            None
        }
    }
}
