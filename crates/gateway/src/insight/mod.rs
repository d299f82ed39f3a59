//! Website Insight Provider: page analysis for URLs the user mentions and
//! a text-search fallback for everything else.

pub mod html;
pub mod http;

use serde::{Deserialize, Serialize};
use ts_domain::error::Result;
use ts_domain::insight::WebsiteInsight;

pub use self::http::HttpInsightProvider;

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// External lookups the conversation controller can make on the user's
/// behalf. Failures are returned, never panicked; the controller turns
/// them into tool messages.
#[async_trait::async_trait]
pub trait InsightProvider: Send + Sync {
    /// Fetch and analyze a page. URLs without a scheme get `https://`.
    async fn analyze(&self, url: &str) -> Result<WebsiteInsight>;

    /// Run a web search for `query`.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// Plain-text rendering of search hits for a tool result.
pub fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No search results for \"{query}\".");
    }
    let mut out = format!("Search results for \"{query}\":\n");
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!("{}. {} ({})\n", i + 1, hit.title, hit.link));
        if !hit.snippet.is_empty() {
            out.push_str(&format!("   {}\n", hit.snippet));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hits_with_snippets() {
        let hits = vec![SearchHit {
            title: "Sourdough basics".into(),
            link: "https://bread.example/sourdough".into(),
            snippet: "Start with a healthy starter.".into(),
        }];
        let out = format_hits("sourdough", &hits);
        assert!(out.starts_with("Search results for \"sourdough\":"));
        assert!(out.contains("1. Sourdough basics (https://bread.example/sourdough)"));
        assert!(out.contains("   Start with a healthy starter."));
    }

    #[test]
    fn empty_hits_say_so() {
        assert_eq!(format_hits("x", &[]), "No search results for \"x\".");
    }
}
