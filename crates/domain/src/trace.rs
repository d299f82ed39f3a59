use serde::Serialize;

use crate::task::TaskDomain;

/// Where a task list came from.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskSource {
    Model,
    Fallback,
}

/// Structured trace events emitted across all TaskSmith crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        session_id: String,
    },
    SessionCleared {
        session_id: String,
        existed: bool,
    },
    DomainClassified {
        session_id: String,
        domain: TaskDomain,
    },
    ReadinessEvaluated {
        session_id: String,
        user_messages: usize,
        questions_asked: u32,
        ready: bool,
        reason: String,
    },
    LlmRequest {
        provider: String,
        model: String,
        purpose: String,
        json_mode: bool,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    ToolInvoked {
        session_id: String,
        tool_name: String,
        target: String,
        ok: bool,
    },
    TasksGenerated {
        session_id: String,
        source: TaskSource,
        count: usize,
    },
    TaskEdited {
        session_id: String,
        index: usize,
        forced_change: bool,
    },
    QuestionnaireDetected {
        session_id: String,
        candidates: usize,
    },
    FallbackUsed {
        session_id: String,
        branch: String,
        reason: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "ts_event");
    }
}
