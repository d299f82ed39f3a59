//! reqwest-backed [`InsightProvider`].
//!
//! Fetch limits:
//! - hard timeout (`insight.timeout_secs`)
//! - streamed body capped at `insight.max_bytes`
//! - redirect limit (`insight.max_redirects`)
//! - User-Agent identifies the bot

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde_json::{json, Value};
use ts_domain::config::InsightConfig;
use ts_domain::error::{Error, Result};
use ts_domain::insight::WebsiteInsight;

use super::html::{analyze_html, normalize_url};
use super::{InsightProvider, SearchHit};

const BOT_USER_AGENT: &str = concat!("TaskSmith/", env!("CARGO_PKG_VERSION"), " (website insight)");

fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Serper-compatible search endpoint plus its credential.
struct SearchBackend {
    endpoint: String,
    api_key: String,
    results: usize,
}

pub struct HttpInsightProvider {
    client: reqwest::Client,
    max_bytes: usize,
    excerpt_chars: usize,
    search: Option<SearchBackend>,
}

impl HttpInsightProvider {
    /// Build from config. Search is enabled only when both an endpoint and
    /// a non-empty credential are available.
    pub fn from_config(cfg: &InsightConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(cfg.max_redirects))
            .build()
            .map_err(from_reqwest)?;

        let api_key = cfg
            .search_api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.trim().is_empty());
        let search = match (cfg.search_endpoint.clone(), api_key) {
            (Some(endpoint), Some(api_key)) => Some(SearchBackend {
                endpoint,
                api_key: api_key.trim().to_string(),
                results: cfg.search_results,
            }),
            _ => None,
        };
        if search.is_none() {
            tracing::info!("web search disabled (no endpoint or credential)");
        }

        Ok(Self {
            client,
            max_bytes: cfg.max_bytes,
            excerpt_chars: cfg.excerpt_chars,
            search,
        })
    }

    pub fn search_enabled(&self) -> bool {
        self.search.is_some()
    }

    async fn read_capped(&self, resp: reqwest::Response) -> Result<Vec<u8>> {
        let mut stream = resp.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(from_reqwest)?;
            if buf.len() + chunk.len() > self.max_bytes {
                return Err(Error::Insight(format!(
                    "response exceeded {} bytes limit",
                    self.max_bytes
                )));
            }
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }
}

#[async_trait::async_trait]
impl InsightProvider for HttpInsightProvider {
    async fn analyze(&self, url: &str) -> Result<WebsiteInsight> {
        let target =
            normalize_url(url).ok_or_else(|| Error::Insight(format!("not a web address: {url}")))?;

        tracing::debug!(url = %target, "fetching page for analysis");
        let resp = self
            .client
            .get(target.clone())
            .header(USER_AGENT, BOT_USER_AGENT)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status().as_u16();
        let final_url = resp.url().clone();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(Error::Insight(format!(
                "{final_url} is not an HTML page ({content_type})"
            )));
        }

        let body = self.read_capped(resp).await?;
        let html = String::from_utf8_lossy(&body);
        Ok(analyze_html(&final_url, status, &html, self.excerpt_chars))
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let Some(backend) = &self.search else {
            return Err(Error::Insight("web search is not configured".into()));
        };

        let resp = self
            .client
            .post(&backend.endpoint)
            .header(USER_AGENT, BOT_USER_AGENT)
            .header("X-API-KEY", &backend.api_key)
            .json(&json!({ "q": query, "num": backend.results }))
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let body = self.read_capped(resp).await?;
        if !status.is_success() {
            return Err(Error::Insight(format!(
                "search endpoint returned HTTP {}",
                status.as_u16()
            )));
        }
        let value: Value = serde_json::from_slice(&body)?;
        Ok(parse_search_hits(&value, backend.results))
    }
}

/// Read `organic[]` entries from a Serper-style response.
fn parse_search_hits(value: &Value, limit: usize) -> Vec<SearchHit> {
    value
        .get("organic")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<SearchHit>(item.clone()).ok())
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_disabled_without_credential() {
        let cfg = InsightConfig {
            search_api_key_env: Some("TS_TEST_MISSING_SEARCH_KEY_5150".into()),
            ..Default::default()
        };
        let provider = HttpInsightProvider::from_config(&cfg).unwrap();
        assert!(!provider.search_enabled());
    }

    #[test]
    fn search_enabled_with_credential() {
        std::env::set_var("TS_TEST_SEARCH_KEY_7788", "key");
        let cfg = InsightConfig {
            search_api_key_env: Some("TS_TEST_SEARCH_KEY_7788".into()),
            ..Default::default()
        };
        let provider = HttpInsightProvider::from_config(&cfg).unwrap();
        assert!(provider.search_enabled());
        std::env::remove_var("TS_TEST_SEARCH_KEY_7788");
    }

    #[tokio::test]
    async fn search_without_backend_is_an_error() {
        let provider = HttpInsightProvider::from_config(&InsightConfig::default()).unwrap();
        let err = provider.search("bakery marketing").await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn analyze_rejects_non_web_addresses() {
        let provider = HttpInsightProvider::from_config(&InsightConfig::default()).unwrap();
        let err = provider.analyze("ftp://files.example").await.unwrap_err();
        assert!(matches!(err, Error::Insight(_)));
    }

    #[test]
    fn parses_organic_results() {
        let value = json!({
            "organic": [
                {"title": "A", "link": "https://a.example", "snippet": "aa"},
                {"title": "B", "link": "https://b.example"},
                {"link": "missing title"},
                {"title": "C", "link": "https://c.example"}
            ]
        });
        let hits = parse_search_hits(&value, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].snippet, "aa");
        assert_eq!(hits[1].snippet, "");
        assert!(parse_search_hits(&json!({}), 5).is_empty());
    }
}
