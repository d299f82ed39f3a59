//! The shapes a model reply can take, and their ordered resolution.

use serde_json::{Map, Value};
use ts_domain::task::Task;

use crate::assemble::TurnResponse;
use crate::extract::parse_tasks_from_text;
use crate::normalize::TaskLimits;

/// A model reply, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTaskPayload {
    /// A bare JSON array of tasks.
    List(Vec<Task>),
    /// `{"tasks": [...]}`, possibly with an accompanying reply.
    Wrapped { tasks: Vec<Task>, reply: Option<String> },
    /// A single task object carrying title, description and estimate.
    Single(Task),
    /// `{"reply": "..."}` with no usable tasks.
    Reply(String),
    /// Anything that is not one of the JSON shapes above.
    Text(String),
}

impl ModelTaskPayload {
    /// Classify raw model output. Markdown code fences are ignored, and a
    /// JSON value embedded in surrounding prose is still found.
    pub fn parse(raw: &str) -> Self {
        let trimmed = strip_code_fence(raw.trim());
        match parse_json(trimmed) {
            Some(value) => Self::from_value(value, raw),
            None => Self::Text(raw.trim().to_string()),
        }
    }

    fn from_value(value: Value, raw: &str) -> Self {
        match value {
            Value::Array(items) => Self::List(items.iter().filter_map(task_from_value).collect()),
            Value::Object(map) => {
                let reply = map
                    .get("reply")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .filter(|r| !r.trim().is_empty());
                let tasks: Vec<Task> = map
                    .get("tasks")
                    .and_then(Value::as_array)
                    .map(|items| items.iter().filter_map(task_from_value).collect())
                    .unwrap_or_default();

                if !tasks.is_empty() {
                    Self::Wrapped { tasks, reply }
                } else if let Some(reply) = reply {
                    Self::Reply(reply)
                } else if is_single_task(&map) {
                    task_from_map(&map).map_or_else(|| Self::Text(raw.trim().to_string()), Self::Single)
                } else {
                    Self::Text(raw.trim().to_string())
                }
            }
            Value::String(s) => Self::Text(s),
            _ => Self::Text(raw.trim().to_string()),
        }
    }

    /// Resolve into raw candidates plus the accompanying reply.
    ///
    /// JSON task shapes are used directly. A reply string or free text is
    /// left for the assembler, which runs prose extraction on it.
    pub fn into_response(self) -> TurnResponse {
        match self {
            Self::List(tasks) => TurnResponse::tasks(tasks),
            Self::Wrapped { tasks, reply } => TurnResponse { tasks, reply },
            Self::Single(task) => TurnResponse::tasks(vec![task]),
            Self::Reply(text) | Self::Text(text) => TurnResponse::reply(text),
        }
    }

    /// The first task candidate, for single-task edits.
    pub fn first_task(self, limits: TaskLimits) -> Option<Task> {
        match self {
            Self::List(tasks) | Self::Wrapped { tasks, .. } => tasks.into_iter().next(),
            Self::Single(task) => Some(task),
            Self::Reply(text) | Self::Text(text) => {
                parse_tasks_from_text(&text, limits).and_then(|t| t.into_iter().next())
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JSON helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const TITLE_KEYS: &[&str] = &["title", "name", "task"];
const DESCRIPTION_KEYS: &[&str] = &["description", "details", "desc"];
const ESTIMATE_KEYS: &[&str] = &[
    "timeEstimate",
    "time_estimate",
    "estimatedTime",
    "estimated_time",
    "duration",
    "time",
];

fn strip_code_fence(text: &str) -> &str {
    let fence = regex!(r"(?s)^```[A-Za-z]*\s*\n?(.*?)\s*```$");
    fence
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str())
}

fn parse_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    // JSON wrapped in prose: try the outermost object, then array.
    [('{', '}'), ('[', ']')].iter().find_map(|&(open, close)| {
        let start = text.find(open)?;
        let end = text.rfind(close)?;
        (end > start)
            .then(|| serde_json::from_str::<Value>(&text[start..=end]).ok())
            .flatten()
            .filter(|v| {
                v.is_object() || v.as_array().is_some_and(|items| items.iter().any(Value::is_object))
            })
    })
}

fn field_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match map.get(*k)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn is_single_task(map: &Map<String, Value>) -> bool {
    field_text(map, TITLE_KEYS).is_some()
        && field_text(map, DESCRIPTION_KEYS).is_some()
        && field_text(map, ESTIMATE_KEYS).is_some()
}

fn task_from_map(map: &Map<String, Value>) -> Option<Task> {
    let title = field_text(map, TITLE_KEYS).unwrap_or_default();
    let description = field_text(map, DESCRIPTION_KEYS).unwrap_or_default();
    if title.trim().is_empty() && description.trim().is_empty() {
        return None;
    }
    Some(Task {
        id: None,
        title,
        description,
        time_estimate: field_text(map, ESTIMATE_KEYS).unwrap_or_default(),
    })
}

fn task_from_value(value: &Value) -> Option<Task> {
    match value {
        Value::Object(map) => task_from_map(map),
        Value::String(s) if !s.trim().is_empty() => Some(Task::new(s.clone(), "", "")),
        _ => None,
    }
}
