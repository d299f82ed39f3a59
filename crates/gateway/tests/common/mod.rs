//! Scripted collaborators shared by the gateway integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use ts_domain::config::Config;
use ts_domain::error::{Error, Result};
use ts_domain::insight::WebsiteInsight;
use ts_domain::tool::ToolCall;
use ts_gateway::bootstrap;
use ts_gateway::insight::{InsightProvider, SearchHit};
use ts_gateway::state::AppState;
use ts_providers::{ChatRequest, ChatResponse, LlmProvider};
use ts_sessions::{InMemorySessionStore, SessionStore};

/// One scripted model answer.
pub enum Step {
    Reply(ChatResponse),
    Fail(String),
    /// Never answers in time.
    Stall,
}

pub fn text(content: &str) -> Step {
    Step::Reply(ChatResponse::text(content))
}

pub fn fail(message: &str) -> Step {
    Step::Fail(message.into())
}

pub fn tool_call(call_id: &str, arguments: serde_json::Value) -> Step {
    Step::Reply(ChatResponse {
        tool_calls: vec![ToolCall {
            call_id: call_id.into(),
            tool_name: "research".into(),
            arguments,
        }],
        ..Default::default()
    })
}

/// Language model that plays back a fixed script and records every request.
#[derive(Default)]
pub struct ScriptedLlm {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, step: Step) {
        self.steps.lock().push_back(step);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    pub fn remaining(&self) -> usize {
        self.steps.lock().len()
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlm {
    async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().push(req.clone());
        let step = self.steps.lock().pop_front();
        match step {
            Some(Step::Reply(resp)) => Ok(resp),
            Some(Step::Fail(message)) => Err(Error::Provider {
                provider: "scripted".into(),
                message,
            }),
            Some(Step::Stall) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(Error::Other("stalled".into()))
            }
            None => Err(Error::Provider {
                provider: "scripted".into(),
                message: "script exhausted".into(),
            }),
        }
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}

/// Insight provider that answers from memory.
#[derive(Default)]
pub struct StubInsight {
    pub analyzed: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl InsightProvider for StubInsight {
    async fn analyze(&self, url: &str) -> Result<WebsiteInsight> {
        self.analyzed.lock().push(url.to_string());
        Ok(WebsiteInsight {
            url: url.to_string(),
            status: 200,
            title: Some("Crumb & Co Bakery".into()),
            word_count: 420,
            ..Default::default()
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        Ok(vec![SearchHit {
            title: format!("About {query}"),
            link: "https://search.example/1".into(),
            snippet: String::new(),
        }])
    }
}

pub struct Harness {
    pub state: AppState,
    pub llm: Arc<ScriptedLlm>,
    pub insight: Arc<StubInsight>,
}

pub fn harness(steps: Vec<Step>) -> Harness {
    harness_with(Config::default(), steps)
}

pub fn harness_with(config: Config, steps: Vec<Step>) -> Harness {
    let llm = ScriptedLlm::new(steps);
    let insight = Arc::new(StubInsight::default());
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let state = bootstrap::assemble_state(
        Arc::new(config),
        llm.clone(),
        insight.clone(),
        sessions,
    );
    Harness {
        state,
        llm,
        insight,
    }
}

/// A well-formed three-task JSON answer.
pub const THREE_TASKS_JSON: &str = r#"{"tasks": [
    {"title": "Fix page titles", "description": "Rewrite the title tags on the ten most visited pages.", "timeEstimate": "2 hours"},
    {"title": "Compress product photos", "description": "Resize and compress every image on the menu page.", "timeEstimate": "1 hour"},
    {"title": "Submit an XML sitemap", "description": "Generate a sitemap and submit it in Search Console.", "timeEstimate": "30 minutes"}
]}"#;

/// A long, detailed user message (well over a hundred words).
pub fn detailed_message() -> String {
    "Our bakery site gets a few visitors but almost nobody finds us on Google for local searches. "
        .repeat(8)
}
