//! Request and response types for the StarTrader service

use serde::{Deserialize, Serialize};
use trade_tools::ProxyStats;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub tools: usize,
    pub cache: ProxyStats,
}

/// Cleanup summary returned to the cron trigger
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub scanned: usize,
    pub deleted_files: Vec<String>,
    pub failed_files: Vec<String>,
}

/// A function call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    #[serde(default)]
    pub arguments: String,
}

/// One chat-completions message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl ChatMessage {
    pub fn system(content: String) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content),
            name: None,
            function_call: None,
        }
    }

    /// Result of a function call, fed back to the model
    pub fn function(name: &str, content: String) -> Self {
        Self {
            role: "function".to_string(),
            content: Some(content),
            name: Some(name.to_string()),
            function_call: None,
        }
    }

    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_response_field_names() {
        let response = CleanupResponse {
            message: "Cleanup complete".to_string(),
            scanned: 2,
            deleted_files: vec!["cache/a".to_string()],
            failed_files: vec![],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["deletedFiles"][0], "cache/a");
        assert!(json["failedFiles"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_function_call_message_deserialization() {
        let json = r#"{
            "role": "assistant",
            "content": null,
            "function_call": { "name": "get_moons", "arguments": "{\"id_planet\": 4}" }
        }"#;

        let message: ChatMessage = serde_json::from_str(json).unwrap();
        assert_eq!(message.content, None);
        let call = message.function_call.unwrap();
        assert_eq!(call.name, "get_moons");
        assert_eq!(call.arguments, "{\"id_planet\": 4}");
    }

    #[test]
    fn test_plain_message_omits_optional_fields() {
        let message = ChatMessage {
            role: "user".to_string(),
            content: Some("Where do I sell Laranite?".to_string()),
            name: None,
            function_call: None,
        };

        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("function_call"));
        assert!(!json.contains("\"name\""));
    }
}
