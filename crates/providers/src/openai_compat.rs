//! OpenAI-compatible adapter.
//!
//! Works with OpenAI and any endpoint that follows the chat completions
//! contract (Ollama, vLLM, LM Studio, Together, ...).

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use ts_domain::config::LlmConfig;
use ts_domain::error::{Error, Result};
use ts_domain::tool::{Message, Role, ToolCall, ToolDefinition, ToolMetadata};
use ts_domain::trace::TraceEvent;

use crate::traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
use crate::util::from_reqwest;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A language model adapter for an OpenAI-compatible endpoint.
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    default_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a provider from config and an already-resolved API key.
    pub fn from_config(cfg: &LlmConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: cfg.provider_id.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model: cfg.model.clone(),
            client,
        })
    }

    fn effective_model(&self, req: &ChatRequest) -> String {
        req.model
            .clone()
            .unwrap_or_else(|| self.default_model.clone())
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(message_to_wire).collect();

        let mut body = json!({
            "model": self.effective_model(req),
            "messages": messages,
        });

        if !req.tools.is_empty() {
            let tools: Vec<Value> = req.tools.iter().map(tool_to_wire).collect();
            body["tools"] = Value::Array(tools);
            body["tool_choice"] = json!("auto");
        }
        if let Some(temp) = req.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max) = req.max_tokens {
            body["max_tokens"] = json!(max);
        }
        if req.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message serialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

/// Content is always a string on the wire; the API rejects `null` on some
/// message kinds.
fn message_to_wire(msg: &Message) -> Value {
    let mut obj = json!({
        "role": role_to_str(msg.role),
        "content": msg.content,
    });

    match (&msg.role, &msg.tool_metadata) {
        (Role::Assistant, Some(ToolMetadata::Calls { calls })) if !calls.is_empty() => {
            let wire: Vec<Value> = calls
                .iter()
                .map(|c| {
                    json!({
                        "id": c.call_id,
                        "type": "function",
                        "function": {
                            "name": c.tool_name,
                            "arguments": c.arguments.to_string(),
                        }
                    })
                })
                .collect();
            obj["tool_calls"] = Value::Array(wire);
        }
        (Role::Tool, Some(ToolMetadata::Result { call_id, .. })) => {
            obj["tool_call_id"] = Value::String(call_id.clone());
        }
        _ => {}
    }
    obj
}

fn tool_to_wire(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response deserialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn provider_err(provider: &str, message: impl Into<String>) -> Error {
    Error::Provider {
        provider: provider.to_string(),
        message: message.into(),
    }
}

fn parse_chat_response(provider: &str, body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| provider_err(provider, "no choices in response"))?;

    let message = choice
        .get("message")
        .ok_or_else(|| provider_err(provider, "no message in choice"))?;

    // A null content (tool-call-only reply) becomes the empty string.
    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(ChatResponse {
        content,
        tool_calls: parse_tool_calls(message),
        usage: body.get("usage").and_then(parse_usage),
        model: body
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string(),
        finish_reason: choice
            .get("finish_reason")
            .and_then(|v| v.as_str())
            .map(String::from),
    })
}

fn parse_tool_calls(message: &Value) -> Vec<ToolCall> {
    let Some(arr) = message.get("tool_calls").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    arr.iter()
        .filter_map(|tc| {
            let func = tc.get("function")?;
            let raw_args = func.get("arguments").and_then(|v| v.as_str()).unwrap_or("{}");
            Some(ToolCall {
                call_id: tc.get("id")?.as_str()?.to_string(),
                tool_name: func.get("name")?.as_str()?.to_string(),
                // Malformed argument JSON degrades to an empty object.
                arguments: serde_json::from_str(raw_args).unwrap_or_else(|_| json!({})),
            })
        })
        .collect()
}

fn parse_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_chat_body(req);
        let started = Instant::now();

        tracing::debug!(
            provider = %self.id,
            url = %url,
            messages = req.messages.len(),
            tools = req.tools.len(),
            json_mode = req.json_mode,
            "chat completion request"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(provider_err(
                &self.id,
                format!("HTTP {} - {}", status.as_u16(), resp_text),
            ));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        let parsed = parse_chat_response(&self.id, &resp_json)?;

        TraceEvent::LlmRequest {
            provider: self.id.clone(),
            model: parsed.model.clone(),
            purpose: if req.json_mode { "structured" } else { "dialogue" }.into(),
            json_mode: req.json_mode,
            duration_ms: started.elapsed().as_millis() as u64,
            prompt_tokens: parsed.usage.map(|u| u.prompt_tokens),
            completion_tokens: parsed.usage.map(|u| u.completion_tokens),
        }
        .emit();

        Ok(parsed)
    }

    fn provider_id(&self) -> &str {
        &self.id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider::from_config(&LlmConfig::default(), "sk-test".into()).unwrap()
    }

    #[test]
    fn body_includes_json_mode_and_tools() {
        let req = ChatRequest::new(vec![Message::user("hello")])
            .with_tools(vec![ToolDefinition {
                name: "analyze_website".into(),
                description: "d".into(),
                parameters: json!({"type": "object"}),
            }])
            .json();
        let body = provider().build_chat_body(&req);
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["tools"][0]["function"]["name"], "analyze_website");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn tool_messages_round_trip_to_wire() {
        let call = ToolCall {
            call_id: "call_9".into(),
            tool_name: "analyze_website".into(),
            arguments: json!({"url": "example.com"}),
        };
        let assistant = message_to_wire(&Message::assistant_tool_calls("", &[call]));
        assert_eq!(assistant["content"], "");
        assert_eq!(assistant["tool_calls"][0]["id"], "call_9");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            r#"{"url":"example.com"}"#
        );

        let result = message_to_wire(&Message::tool_result("call_9", "analyze_website", "ok"));
        assert_eq!(result["role"], "tool");
        assert_eq!(result["tool_call_id"], "call_9");
    }

    #[test]
    fn parses_text_response() {
        let body = json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "What is your goal?"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        });
        let resp = parse_chat_response("openai", &body).unwrap();
        assert_eq!(resp.content, "What is your goal?");
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn parses_tool_call_with_null_content() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "analyze_website", "arguments": "{\"url\":\"a.com\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let resp = parse_chat_response("openai", &body).unwrap();
        assert_eq!(resp.content, "");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].arguments["url"], "a.com");
    }

    #[test]
    fn missing_choices_is_provider_error() {
        let err = parse_chat_response("openai", &json!({})).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }
}
