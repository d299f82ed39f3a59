pub mod chat;
pub mod error;
pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::post_chat))
        .route("/chat/:session_id", get(chat::get_session).delete(chat::delete_chat))
        .route("/health", get(health::health))
}
