//! Prompt construction for policy analysis.
//!
//! [`build_messages`] turns an [`AnalysisRequest`] into the two chat messages
//! sent to the model. The tool schema is not part of the messages; see
//! [`crate::schema`].

use serde::{Deserialize, Serialize};

use crate::AnalysisRequest;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => f.write_str("system"),
            MessageRole::User => f.write_str("user"),
        }
    }
}

/// One role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: MessageRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

const SYSTEM_INSTRUCTIONS: &str = "\
You are an expert insurance policy analysis engine.

Your job:
- extract coverage details
- identify exclusions
- extract deductibles
- assess risk level
- detect required follow-up actions
- flag inconsistencies or legal-review needs

Output MUST strictly follow the JSON schema provided via tool calling.
Do NOT include explanations, summaries, or reasoning outside the structured output.
";

/// Builds the `[system, user]` message pair for `request`.
///
/// The policy text is appended verbatim at the end of the user message. Equal
/// requests always produce equal messages.
pub fn build_messages(request: &AnalysisRequest) -> Vec<PromptMessage> {
    vec![
        PromptMessage::system(system_content(request)),
        PromptMessage::user(user_content(request)),
    ]
}

fn system_content(request: &AnalysisRequest) -> String {
    let jurisdiction = request
        .jurisdiction()
        .map(|j| j.as_str())
        .unwrap_or_default();

    format!(
        "{SYSTEM_INSTRUCTIONS}\nJurisdiction: {jurisdiction}\nLanguage: {language}\n",
        language = request.language(),
    )
}

fn user_content(request: &AnalysisRequest) -> String {
    // An absent or empty map is rendered as `{}`.
    let metadata = match request.metadata() {
        Some(map) if !map.is_empty() => serde_json::Value::Object(map.clone()).to_string(),
        _ => "{}".to_string(),
    };

    format!(
        "Analyze the following insurance policy text.\n\n\
         Policy Type: {policy_type}\n\
         Metadata: {metadata}\n\n\
         Policy Text:\n{policy_text}",
        policy_type = request.policy_type().unwrap_or_default(),
        policy_text = request.policy_text(),
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::Jurisdiction;

    fn health_request() -> AnalysisRequest {
        AnalysisRequest::new("Comprehensive health insurance covering hospital stays.").unwrap()
    }

    #[test]
    fn builds_system_then_user_message() {
        let messages = build_messages(&health_request());

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].role, MessageRole::User);
    }

    #[test]
    fn system_message_carries_defaults_when_not_overridden() {
        let messages = build_messages(&health_request());
        let system = &messages[0].content;

        assert!(system.contains("expert insurance policy analysis engine"));
        assert!(system.contains("Jurisdiction:"));
        assert!(system.contains("Language: en"));
    }

    #[test]
    fn system_message_carries_requested_jurisdiction_and_language() {
        let request = health_request()
            .with_jurisdiction(Jurisdiction::It)
            .with_language("it");
        let system = &build_messages(&request)[0].content;

        assert!(system.contains("Jurisdiction: IT\n"));
        assert!(system.contains("Language: it\n"));
    }

    #[test]
    fn user_message_keeps_policy_text_verbatim() {
        let text = "  Clause 1: weird   spacing\n\tClause 2: «unicode» & <markup>  ";
        let request = AnalysisRequest::new(text).unwrap();
        let user = &build_messages(&request)[1].content;

        assert!(user.ends_with(&format!("Policy Text:\n{text}")));
    }

    #[test]
    fn user_message_renders_metadata_as_compact_json() {
        let mut metadata = Map::new();
        metadata.insert("customerId".into(), json!(42));
        let request = health_request()
            .with_policy_type("health")
            .with_metadata(metadata);
        let user = &build_messages(&request)[1].content;

        assert!(user.contains("Policy Type: health\n"));
        assert!(user.contains("Metadata: {\"customerId\":42}\n"));
    }

    #[test]
    fn user_message_renders_missing_metadata_as_empty_object() {
        let user = &build_messages(&health_request())[1].content;

        assert!(user.contains("Policy Type: \n"));
        assert!(user.contains("Metadata: {}\n"));
    }

    #[test]
    fn equal_requests_give_equal_independent_messages() {
        let request = health_request().with_jurisdiction(Jurisdiction::Eu);

        let first = build_messages(&request);
        let mut second = build_messages(&request);
        assert_eq!(first, second);

        second[1].content.push_str(" tampered");
        second.pop();
        assert_eq!(first.len(), 2);
        assert_eq!(first, build_messages(&request));
    }

    #[test]
    fn roles_serialise_lowercase() {
        let value = serde_json::to_value(PromptMessage::system("x")).unwrap();
        assert_eq!(value, json!({"role": "system", "content": "x"}));
    }
}
