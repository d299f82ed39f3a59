use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Website insight & search
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Hard timeout for a page fetch.
    #[serde(default = "d_timeout_secs")]
    pub timeout_secs: u64,
    /// Responses larger than this are rejected.
    #[serde(default = "d_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "d_max_redirects")]
    pub max_redirects: usize,
    /// Characters of readable page text kept in the insight excerpt.
    #[serde(default = "d_excerpt_chars")]
    pub excerpt_chars: usize,
    /// Serper-compatible search endpoint used when the model asks for a
    /// search without a URL. `None` disables search.
    #[serde(default = "d_search_endpoint")]
    pub search_endpoint: Option<String>,
    /// Environment variable holding the search credential.
    #[serde(default)]
    pub search_api_key_env: Option<String>,
    #[serde(default = "d_search_results")]
    pub search_results: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            timeout_secs: d_timeout_secs(),
            max_bytes: d_max_bytes(),
            max_redirects: d_max_redirects(),
            excerpt_chars: d_excerpt_chars(),
            search_endpoint: d_search_endpoint(),
            search_api_key_env: None,
            search_results: d_search_results(),
        }
    }
}

fn d_timeout_secs() -> u64 {
    10
}
fn d_max_bytes() -> usize {
    2 * 1024 * 1024
}
fn d_max_redirects() -> usize {
    5
}
fn d_excerpt_chars() -> usize {
    1_500
}
fn d_search_endpoint() -> Option<String> {
    Some("https://google.serper.dev/search".into())
}
fn d_search_results() -> usize {
    5
}
