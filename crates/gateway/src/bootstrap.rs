//! AppState construction shared by the CLI commands (`serve`, `run`,
//! `chat`) so each boots the same runtime.

use std::sync::Arc;

use anyhow::Context;

use ts_domain::config::{Config, ConfigSeverity};
use ts_providers::{resolve_api_key, LlmProvider, OpenAiCompatProvider};
use ts_sessions::{InMemorySessionStore, SessionStore};

use crate::insight::{HttpInsightProvider, InsightProvider};
use crate::runtime::ConversationController;
use crate::state::AppState;

/// Validate config, resolve credentials and return a fully wired
/// [`AppState`]. A missing model credential aborts here, not on the first
/// request.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Language model ───────────────────────────────────────────────
    let api_key = resolve_api_key(&config.llm.api_key_env)
        .with_context(|| format!("resolving API key from {}", config.llm.api_key_env))?;
    let llm: Arc<dyn LlmProvider> = Arc::new(
        OpenAiCompatProvider::from_config(&config.llm, api_key)
            .context("initializing language model provider")?,
    );
    tracing::info!(
        provider = %config.llm.provider_id,
        base_url = %config.llm.base_url,
        model = %config.llm.model,
        "language model provider ready"
    );

    // ── Website insight ──────────────────────────────────────────────
    let insight: Arc<dyn InsightProvider> = Arc::new(
        HttpInsightProvider::from_config(&config.insight)
            .context("initializing website insight provider")?,
    );

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    Ok(assemble_state(config, llm, insight, sessions))
}

/// Wire already constructed collaborators into an [`AppState`]. Tests use
/// this with scripted providers.
pub fn assemble_state(
    config: Arc<Config>,
    llm: Arc<dyn LlmProvider>,
    insight: Arc<dyn InsightProvider>,
    sessions: Arc<dyn SessionStore>,
) -> AppState {
    let controller = Arc::new(ConversationController::new(
        llm,
        insight,
        sessions.clone(),
        config.conversation.clone(),
        &config.llm,
    ));
    AppState {
        config,
        sessions,
        controller,
    }
}
