//! Chat endpoints.
//!
//! - `POST /chat`               run one conversation turn
//! - `GET /chat/:session_id`    session snapshot
//! - `DELETE /chat/:session_id` forget a session (idempotent)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use ts_domain::insight::WebsiteInsight;
use ts_domain::task::{Task, TaskDomain};
use ts_sessions::{InMemorySessionStore, Progress};

use super::error::ApiError;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire shapes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub message: Option<String>,
    /// Existing session to continue. A new id is minted when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub session_id: String,
    pub tasks: Vec<Task>,
    pub reply: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot<'a> {
    pub session_id: &'a str,
    pub domain: Option<TaskDomain>,
    pub progress: &'a Progress,
    pub transcript_len: usize,
    pub last_task_set: Option<&'a [Task]>,
    pub website_insight: Option<&'a WebsiteInsight>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn post_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::BadRequest("message is required".into()))?
        .to_string();

    let session_id = body
        .session_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(InMemorySessionStore::new_session_id);

    tracing::debug!(session_id = %session_id, chars = message.len(), "chat turn");
    let turn = state.controller.handle_message(&session_id, &message).await?;

    Ok(Json(ChatReply {
        session_id,
        tasks: turn.tasks,
        reply: turn.reply,
    }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET / DELETE /chat/:session_id
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("session not found: {session_id}")))?;

    let snapshot = SessionSnapshot {
        session_id: &session.session_id,
        domain: session.domain(),
        progress: &session.progress,
        transcript_len: session.transcript().len(),
        last_task_set: session.last_task_set.as_deref(),
        website_insight: session.website_insight(),
        created_at: session.created_at,
        updated_at: session.updated_at,
    };
    Ok(Json(json!(snapshot)))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let existed = state.controller.clear(&session_id).await?;
    tracing::debug!(session_id = %session_id, existed, "session cleared");
    Ok(Json(json!({ "success": true })))
}
