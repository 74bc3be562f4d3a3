//! Tool (function-calling) schema that forces the model into structured output.
//!
//! The parameters mirror [`crate::AnalysisResult`]. Every object node closes
//! itself with `additionalProperties: false` and lists its required children,
//! so a conformant model can only answer with machine-parseable JSON.

use serde::Serialize;
use serde_json::{json, Value};

use crate::RiskLevel;

/// Name of the single tool the model is forced to call.
pub const POLICY_ANALYSIS_TOOL: &str = "analyze_insurance_policy";

/// A function tool in the chat-completions `tools` array format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionSchema,
}

/// The `function` member of a [`ToolSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: "function",
            function: FunctionSchema {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Function name, used to force the tool choice.
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// JSON schema of the function arguments.
    pub fn parameters(&self) -> &Value {
        &self.function.parameters
    }
}

/// Returns the `analyze_insurance_policy` tool.
///
/// The value is constant; repeated calls return equal schemas.
pub fn policy_analysis_tool() -> ToolSchema {
    ToolSchema::new(
        POLICY_ANALYSIS_TOOL,
        "Analyze an insurance policy text and return a structured summary including coverage, \
         deductibles, exclusions, risk level, recommended actions and compliance flags.",
        json!({
            "type": "object",
            "properties": {
                "coverage": coverage_schema(),
                "deductibles": deductibles_schema(),
                "exclusions": string_list(
                    "Key exclusions extracted from the policy.",
                    "A single exclusion clause in concise form.",
                ),
                "riskLevel": {
                    "type": "string",
                    "description": "Qualitative risk level inferred from the policy.",
                    "enum": RiskLevel::RECOGNISED,
                },
                "requiredActions": string_list(
                    "Recommended follow-up actions, checks, or confirmations.",
                    "One recommended action or next step.",
                ),
                "flags": flags_schema(),
            },
            "required": ["coverage", "deductibles", "exclusions", "riskLevel", "flags"],
            "additionalProperties": false,
        }),
    )
}

fn coverage_schema() -> Value {
    json!({
        "type": "object",
        "description": "Overall coverage summary extracted from the policy.",
        "properties": {
            "coverageType": {
                "type": "string",
                "description": "High-level category of coverage, e.g. \"vehicle_liability\", \"property_damage\", \"health\", \"life\".",
            },
            "coverageAmount": {
                "type": "string",
                "description": "Human-readable main coverage limit, including currency if possible, e.g. \"€1,000,000\".",
            },
            "coverageBreakdown": {
                "type": "array",
                "description": "Optional detailed breakdown by category.",
                "items": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Coverage category, e.g. \"property_damage\", \"bodily_injury\".",
                        },
                        "limit": {
                            "type": "string",
                            "description": "Coverage limit for this category, including currency if possible.",
                        },
                    },
                    "required": ["category", "limit"],
                    "additionalProperties": false,
                },
            },
        },
        "required": ["coverageType", "coverageAmount"],
        "additionalProperties": false,
    })
}

fn deductibles_schema() -> Value {
    json!({
        "type": "array",
        "description": "List of deductibles described in the policy.",
        "items": {
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "description": "Type of deductible, e.g. \"collision\", \"theft\", \"medical\".",
                },
                "amount": {
                    "type": "string",
                    "description": "Deductible amount, including currency if possible.",
                },
            },
            "required": ["type", "amount"],
            "additionalProperties": false,
        },
    })
}

fn flags_schema() -> Value {
    json!({
        "type": "object",
        "description": "Compliance and review flags for the policy.",
        "properties": {
            "needsLegalReview": {
                "type": "boolean",
                "description": "True if a human legal review is strongly recommended.",
            },
            "inconsistentClausesDetected": {
                "type": "boolean",
                "description": "True if the model detected contradictions or inconsistencies.",
            },
        },
        "required": ["needsLegalReview", "inconsistentClausesDetected"],
        "additionalProperties": false,
    })
}

fn string_list(description: &str, item_description: &str) -> Value {
    json!({
        "type": "array",
        "description": description,
        "items": {
            "type": "string",
            "description": item_description,
        },
    })
}
