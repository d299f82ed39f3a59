use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Language model provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Identifier used in logs and trace events.
    #[serde(default = "d_provider_id")]
    pub provider_id: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    #[serde(default = "d_model")]
    pub model: String,
    /// Environment variable holding the API key. Read once at startup;
    /// a missing value aborts startup.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Transport-level timeout for a single completion request.
    #[serde(default = "d_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    /// Upper bound on completion tokens for task generation.
    #[serde(default = "d_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_id: d_provider_id(),
            base_url: d_base_url(),
            model: d_model(),
            api_key_env: d_api_key_env(),
            request_timeout_ms: d_request_timeout_ms(),
            temperature: d_temperature(),
            max_tokens: d_max_tokens(),
        }
    }
}

fn d_provider_id() -> String {
    "openai".into()
}
fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_model() -> String {
    "gpt-4o-mini".into()
}
fn d_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn d_request_timeout_ms() -> u64 {
    30_000
}
fn d_temperature() -> f32 {
    0.7
}
fn d_max_tokens() -> u32 {
    1_500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_config_overrides_model_only() {
        let cfg: LlmConfig = toml::from_str(r#"model = "gpt-4o""#).unwrap();
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.api_key_env, "OPENAI_API_KEY");
        assert_eq!(cfg.base_url, "https://api.openai.com/v1");
    }
}
