//! Chat relay to an OpenAI-compatible chat-completions API
//!
//! Trims the conversation to the provider's input budget, prepends the system
//! prompt (plus knowledge base), offers the tool catalogue as `functions`, and
//! runs at most one requested function before asking for the final answer.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use trade_tools::{Payload, ToolArgs, ToolRegistry};

use crate::config::LlmConfig;
use crate::knowledge::KnowledgeBase;
use crate::types::ChatMessage;

/// Provider tokens-per-minute limit
pub const MAX_TPM: usize = 30_000;
pub const MAX_OUTPUT_TOKENS: usize = 2_500;
pub const MAX_INPUT_TOKENS: usize = MAX_TPM - MAX_OUTPUT_TOKENS;
pub const MAX_RECENT_MESSAGES: usize = 10;

const KNOWLEDGE_BASE_FALLBACK: &str =
    "Knowledge base could not be loaded. Please try again later.";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a trading assistant for Star Citizen. \
Answer with data from the UEX functions only and say so when data is unavailable.";

#[derive(Debug)]
pub enum ChatError {
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Json(serde_json::Error),
    EmptyResponse,
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "LLM HTTP error: {}", e),
            Self::Status { status, body } => write!(f, "LLM returned status {}: {}", status, body),
            Self::Json(e) => write!(f, "LLM JSON parse error: {}", e),
            Self::EmptyResponse => write!(f, "LLM returned no choices"),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Rough token estimate: one token per four characters
pub fn estimate_tokens(message: &ChatMessage) -> usize {
    message.content_len() / 4
}

/// Keep the newest messages that fit in `budget` alongside the system prompt.
/// Stops at the first message that would overflow, so the result is always a
/// contiguous tail of `messages`.
pub fn trim_history(
    system: &ChatMessage,
    messages: &[ChatMessage],
    budget: usize,
) -> Vec<ChatMessage> {
    let mut total = estimate_tokens(system);
    let mut kept = Vec::new();

    for message in messages.iter().rev() {
        let tokens = estimate_tokens(message);
        if total + tokens > budget {
            break;
        }
        total += tokens;
        kept.push(message.clone());
    }

    kept.reverse();
    kept
}

const TRUNCATION_MARKER: &str = "\n[result truncated]";

/// History for the follow-up completion after a function call.
///
/// The function result is cut down so the latest turn, the assistant's call
/// and the result all fit in `budget`; older messages are trimmed as usual.
pub fn followup_history(
    system: &ChatMessage,
    mut history: Vec<ChatMessage>,
    reply: ChatMessage,
    function: &str,
    result: String,
    budget: usize,
) -> Vec<ChatMessage> {
    let reserved = estimate_tokens(system)
        + estimate_tokens(&reply)
        + history.last().map_or(0, estimate_tokens);
    let room = budget.saturating_sub(reserved);

    history.push(reply);
    history.push(ChatMessage::function(function, truncate_to_tokens(result, room)));
    trim_history(system, &history, budget)
}

fn truncate_to_tokens(text: String, tokens: usize) -> String {
    let max_chars = tokens * 4;
    if text.chars().count() <= max_chars {
        return text;
    }

    let keep = max_chars.saturating_sub(TRUNCATION_MARKER.chars().count());
    let end = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    warn!(
        original_chars = text.chars().count(),
        kept_chars = keep,
        "Truncating function result to fit the input budget"
    );
    format!("{}{}", &text[..end], TRUNCATION_MARKER)
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

pub struct ChatRelay {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
    knowledge: Option<KnowledgeBase>,
}

impl ChatRelay {
    pub fn new(config: &LlmConfig, api_key: String, system_prompt: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            system_prompt,
            knowledge: config.knowledge_base_url.as_deref().map(KnowledgeBase::new),
        }
    }

    async fn system_message(&self) -> ChatMessage {
        let Some(knowledge) = &self.knowledge else {
            return ChatMessage::system(self.system_prompt.clone());
        };

        let text = match knowledge.load().await {
            Ok(text) => text.to_string(),
            Err(e) => {
                warn!(error = %e, "Failed to load knowledge base");
                KNOWLEDGE_BASE_FALLBACK.to_string()
            }
        };

        ChatMessage::system(format!(
            "{}\n\n### Knowledge Base\n{}\n\nRead this before calling an API. It explains which IDs and filters each function accepts.",
            self.system_prompt, text
        ))
    }

    async fn complete(
        &self,
        system: &ChatMessage,
        history: &[ChatMessage],
        functions: Option<Vec<Value>>,
    ) -> Result<ChatMessage, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(system.clone());
        messages.extend_from_slice(history);

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": MAX_OUTPUT_TOKENS,
        });
        if let Some(functions) = functions {
            body["functions"] = Value::Array(functions);
            body["function_call"] = json!("auto");
        }

        debug!(messages = history.len() + 1, "Requesting chat completion");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let completion: Completion = serde_json::from_str(&text)?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(ChatError::EmptyResponse)
    }

    /// Answer the conversation, running one tool call if the model asks for it
    pub async fn respond(
        &self,
        tools: &ToolRegistry,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatMessage, ChatError> {
        let system = self.system_message().await;
        let recent = &messages[messages.len().saturating_sub(MAX_RECENT_MESSAGES)..];
        let history = trim_history(&system, recent, MAX_INPUT_TOKENS);

        let reply = self
            .complete(&system, &history, Some(tools.function_specs()))
            .await?;

        let Some(call) = reply.function_call.clone() else {
            return Ok(reply);
        };

        info!(function = %call.name, "Model requested function call");
        let result = run_requested_function(tools, &call.name, &call.arguments).await;

        let followup = followup_history(
            &system,
            history,
            reply,
            &call.name,
            result,
            MAX_INPUT_TOKENS,
        );

        self.complete(&system, &followup, None).await
    }
}

/// Run a model-requested call. Failures become text for the model to explain.
async fn run_requested_function(tools: &ToolRegistry, name: &str, arguments: &str) -> String {
    let args: ToolArgs = if arguments.trim().is_empty() {
        ToolArgs::new()
    } else {
        match serde_json::from_str(arguments) {
            Ok(args) => args,
            Err(e) => return format!("Error: invalid arguments for function {}: {}", name, e),
        }
    };

    match tools.run_function(name, args).await {
        Ok(Payload::Text(text)) => text,
        Ok(Payload::Json(value)) => value.to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};
    use trade_tools::{QueryParams, Tool, ToolDescriptor, ToolError};

    use crate::types::FunctionCall;

    fn user(content: &str) -> ChatMessage {
        ChatMessage {
            role: "user".to_string(),
            content: Some(content.to_string()),
            name: None,
            function_call: None,
        }
    }

    #[test]
    fn test_trim_keeps_newest_within_budget() {
        let system = ChatMessage::system("x".repeat(40)); // 10 tokens
        let messages = vec![
            user(&"a".repeat(400)), // 100 tokens
            user(&"b".repeat(200)), // 50 tokens
            user(&"c".repeat(80)),  // 20 tokens
        ];

        let kept = trim_history(&system, &messages, 100);
        assert_eq!(kept, messages[1..].to_vec());

        let kept = trim_history(&system, &messages, 1_000);
        assert_eq!(kept, messages);

        let kept = trim_history(&system, &messages, 20);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_oversized_function_result_keeps_user_turn() {
        let system = ChatMessage::system("x".repeat(40)); // 10 tokens
        let history = vec![user(&"old".repeat(100)), user("Where do I sell Laranite?")];
        let reply = ChatMessage {
            role: "assistant".to_string(),
            content: None,
            name: None,
            function_call: Some(FunctionCall {
                name: "get_commodities".to_string(),
                arguments: "{}".to_string(),
            }),
        };

        let followup = followup_history(
            &system,
            history,
            reply.clone(),
            "get_commodities",
            "r".repeat(10_000),
            100,
        );

        assert_eq!(followup.len(), 3);
        assert_eq!(followup[0], user("Where do I sell Laranite?"));
        assert_eq!(followup[1], reply);
        assert_eq!(followup[2].name.as_deref(), Some("get_commodities"));

        let content = followup[2].content.as_deref().unwrap();
        assert!(content.ends_with(TRUNCATION_MARKER));
        let total: usize = followup.iter().map(estimate_tokens).sum::<usize>()
            + estimate_tokens(&system);
        assert!(total <= 100);
    }

    #[test]
    fn test_small_function_result_is_untouched() {
        let system = ChatMessage::system(String::new());
        let reply = ChatMessage {
            role: "assistant".to_string(),
            content: Some("checking".to_string()),
            name: None,
            function_call: None,
        };

        let followup = followup_history(
            &system,
            vec![user("hi")],
            reply,
            "get_moons",
            "[]".to_string(),
            1_000,
        );

        assert_eq!(followup.len(), 3);
        assert_eq!(followup[2].content.as_deref(), Some("[]"));
    }

    #[test]
    fn test_trim_stops_at_first_overflow() {
        let system = ChatMessage::system(String::new());
        let messages = vec![user("tiny"), user(&"z".repeat(4_000)), user("last")];

        let kept = trim_history(&system, &messages, 100);
        assert_eq!(kept, vec![user("last")]);
    }

    struct EchoTool {
        descriptor: ToolDescriptor,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn execute(&self, _query: QueryParams) -> Result<Payload, ToolError> {
            Ok(Payload::Json(json!({ "commodity": "Laranite", "price_sell": 3120 })))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool {
            descriptor: ToolDescriptor::new("get_commodities", "All commodities."),
        }));
        registry
    }

    #[derive(Clone)]
    struct FakeProvider {
        seen: Arc<Mutex<Vec<Value>>>,
        mode: &'static str,
    }

    async fn completions(State(provider): State<FakeProvider>, Json(body): Json<Value>) -> Response {
        provider.seen.lock().unwrap().push(body.clone());

        let message = match provider.mode {
            "error" => return (StatusCode::TOO_MANY_REQUESTS, "rate limited").into_response(),
            "function" if body.get("functions").is_some() => json!({
                "role": "assistant",
                "content": null,
                "function_call": { "name": "get_commodities", "arguments": "{}" },
            }),
            _ => {
                let last = body["messages"]
                    .as_array()
                    .and_then(|m| m.last())
                    .and_then(|m| m["content"].as_str())
                    .unwrap_or("")
                    .to_string();
                json!({ "role": "assistant", "content": format!("Answer based on: {}", last) })
            }
        };

        Json(json!({ "choices": [{ "index": 0, "message": message }] })).into_response()
    }

    async fn spawn_provider(mode: &'static str) -> (String, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let router = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(FakeProvider {
                seen: seen.clone(),
                mode,
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}/v1", addr), seen)
    }

    fn relay(base_url: &str) -> ChatRelay {
        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            base_url: base_url.to_string(),
            model: "gpt-4o".to_string(),
            system_prompt_file: None,
            knowledge_base_url: None,
        };
        ChatRelay::new(&config, "sk-test".to_string(), DEFAULT_SYSTEM_PROMPT.to_string())
    }

    #[tokio::test]
    async fn test_function_call_round_trip() {
        let (base, seen) = spawn_provider("function").await;
        let reply = relay(&base)
            .respond(&registry(), vec![user("Where do I sell Laranite?")])
            .await
            .unwrap();

        assert_eq!(reply.role, "assistant");
        assert_eq!(
            reply.content.as_deref(),
            Some(r#"Answer based on: {"commodity":"Laranite","price_sell":3120}"#)
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0]["functions"][0]["name"], "get_commodities");
        assert_eq!(seen[0]["function_call"], "auto");
        assert_eq!(seen[0]["messages"][0]["role"], "system");
        assert!(seen[1].get("functions").is_none());

        let followup = seen[1]["messages"].as_array().unwrap();
        let last = followup.last().unwrap();
        assert_eq!(last["role"], "function");
        assert_eq!(last["name"], "get_commodities");
        assert_eq!(followup[followup.len() - 2]["function_call"]["name"], "get_commodities");
    }

    #[tokio::test]
    async fn test_plain_reply_needs_one_request() {
        let (base, seen) = spawn_provider("plain").await;
        let reply = relay(&base)
            .respond(&registry(), vec![user("hello")])
            .await
            .unwrap();

        assert_eq!(reply.content.as_deref(), Some("Answer based on: hello"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_only_recent_messages_are_sent() {
        let (base, seen) = spawn_provider("plain").await;
        let messages: Vec<ChatMessage> = (0..15).map(|i| user(&format!("message {}", i))).collect();

        relay(&base).respond(&registry(), messages).await.unwrap();

        let seen = seen.lock().unwrap();
        let sent = seen[0]["messages"].as_array().unwrap();
        assert_eq!(sent.len(), MAX_RECENT_MESSAGES + 1);
        assert_eq!(sent[1]["content"], "message 5");
    }

    #[tokio::test]
    async fn test_provider_error_status() {
        let (base, _) = spawn_provider("error").await;
        let err = relay(&base)
            .respond(&registry(), vec![user("hello")])
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_unknown_function_is_reported_to_model() {
        let result = run_requested_function(&registry(), "not_a_real_tool", "{}").await;
        assert_eq!(result, "Error: Function not_a_real_tool is not defined.");

        let result = run_requested_function(&registry(), "get_commodities", "{not json").await;
        assert!(result.starts_with("Error: invalid arguments"));
    }
}
