use std::sync::Arc;

use ts_domain::config::Config;
use ts_sessions::SessionStore;

use crate::runtime::ConversationController;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<dyn SessionStore>,
    pub controller: Arc<ConversationController>,
}
