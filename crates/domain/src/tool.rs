use serde::{Deserialize, Serialize};

/// A tool invocation requested by the model (provider-agnostic).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

/// Tool definition exposed to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: serde_json::Value,
}

/// One entry of a conversation transcript.
///
/// `content` is never null: the empty string stands in for "no text",
/// which is what the chat-completions API accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_metadata: Option<ToolMetadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// Tool bookkeeping attached to assistant tool-call messages and to tool
/// results, so the transcript can be replayed to the model verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolMetadata {
    /// The assistant asked for these tool calls.
    Calls { calls: Vec<ToolCallRef> },
    /// This message is the result of the call with `call_id`.
    Result { call_id: String, tool_name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRef {
    pub call_id: String,
    pub tool_name: String,
    pub arguments: serde_json::Value,
}

// ── Convenience constructors ───────────────────────────────────────

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_metadata: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// An assistant message that carries tool calls (content may be empty).
    pub fn assistant_tool_calls(text: impl Into<String>, calls: &[ToolCall]) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            tool_metadata: Some(ToolMetadata::Calls {
                calls: calls
                    .iter()
                    .map(|c| ToolCallRef {
                        call_id: c.call_id.clone(),
                        tool_name: c.tool_name.clone(),
                        arguments: c.arguments.clone(),
                    })
                    .collect(),
            }),
        }
    }

    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_metadata: Some(ToolMetadata::Result {
                call_id: call_id.into(),
                tool_name: tool_name.into(),
            }),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_omits_metadata() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
        assert!(json.get("tool_metadata").is_none());
    }

    #[test]
    fn tool_result_carries_call_id() {
        let msg = Message::tool_result("call_1", "analyze_website", "{}");
        assert_eq!(msg.role, Role::Tool);
        match msg.tool_metadata {
            Some(ToolMetadata::Result { call_id, .. }) => assert_eq!(call_id, "call_1"),
            other => panic!("unexpected metadata: {other:?}"),
        }
    }
}
