//! The single tool offered to the model while questioning.

use serde_json::{json, Value};
use ts_domain::insight::WebsiteInsight;
use ts_domain::tool::{ToolCall, ToolDefinition};
use ts_domain::trace::TraceEvent;

use crate::insight::{format_hits, InsightProvider};

use super::intent::find_url;

pub const RESEARCH_TOOL: &str = "research";

pub fn research_tool() -> ToolDefinition {
    ToolDefinition {
        name: RESEARCH_TOOL.into(),
        description: "Analyze a website the user mentioned, or search the web for a query. \
                      Pass `url` for a page, otherwise `query`."
            .into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Page to analyze" },
                "query": { "type": "string", "description": "Web search query" }
            }
        }),
    }
}

/// Outcome of one tool call.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    /// Text handed back to the model as the tool message.
    pub content: String,
    /// Set when a page was analyzed successfully.
    pub insight: Option<WebsiteInsight>,
}

fn arg_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Execute a research call. Provider failures become tool text so the
/// model can still ask its question.
pub async fn run_research(
    insight: &dyn InsightProvider,
    session_id: &str,
    call: &ToolCall,
) -> ToolOutcome {
    let url = arg_str(&call.arguments, "url")
        .map(str::to_string)
        .or_else(|| arg_str(&call.arguments, "query").and_then(find_url));
    let query = arg_str(&call.arguments, "query");

    let (outcome, target, ok) = if let Some(url) = url {
        match insight.analyze(&url).await {
            Ok(found) => (
                ToolOutcome {
                    content: found.summary(),
                    insight: Some(found),
                },
                url,
                true,
            ),
            Err(e) => {
                tracing::warn!(session_id, url = %url, error = %e, "website analysis failed");
                (
                    ToolOutcome {
                        content: format!("Could not analyze {url}: {e}"),
                        insight: None,
                    },
                    url,
                    false,
                )
            }
        }
    } else if let Some(query) = query {
        match insight.search(query).await {
            Ok(hits) => (
                ToolOutcome {
                    content: format_hits(query, &hits),
                    insight: None,
                },
                query.to_string(),
                true,
            ),
            Err(e) => {
                tracing::warn!(session_id, query, error = %e, "web search failed");
                (
                    ToolOutcome {
                        content: format!("Search unavailable: {e}. Continue without it."),
                        insight: None,
                    },
                    query.to_string(),
                    false,
                )
            }
        }
    } else {
        (
            ToolOutcome {
                content: "No url or query was provided.".into(),
                insight: None,
            },
            String::new(),
            false,
        )
    };

    TraceEvent::ToolInvoked {
        session_id: session_id.to_string(),
        tool_name: call.tool_name.clone(),
        target,
        ok,
    }
    .emit();
    outcome
}
