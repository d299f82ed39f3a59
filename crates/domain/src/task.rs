use std::fmt;

use serde::{Deserialize, Serialize};

/// Time estimate used whenever the model's estimate is missing or unusable.
pub const DEFAULT_TIME_ESTIMATE: &str = "1 hour";

/// Title used when a task arrives without one.
pub const UNTITLED_TASK: &str = "Untitled Task";

/// Description used when a task arrives without one.
pub const NO_DESCRIPTION: &str = "No description provided.";

/// Number of tasks in a canonical task list.
pub const CANONICAL_TASK_COUNT: usize = 3;

/// A single actionable task surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable 1-based ordinal, preserved across edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub time_estimate: String,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        time_estimate: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            time_estimate: time_estimate.into(),
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Field equality ignoring the id.
    pub fn same_content(&self, other: &Task) -> bool {
        self.title == other.title
            && self.description == other.description
            && self.time_estimate == other.time_estimate
    }
}

/// Topic category of a session, classified once from the first message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskDomain {
    Website,
    Business,
    Education,
    Personal,
    General,
}

impl TaskDomain {
    pub const ALL: [TaskDomain; 5] = [
        TaskDomain::Website,
        TaskDomain::Business,
        TaskDomain::Education,
        TaskDomain::Personal,
        TaskDomain::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskDomain::Website => "website",
            TaskDomain::Business => "business",
            TaskDomain::Education => "education",
            TaskDomain::Personal => "personal",
            TaskDomain::General => "general",
        }
    }

    /// Parse a domain name; anything unrecognised is `General`.
    pub fn parse_lenient(s: &str) -> TaskDomain {
        match s.trim().to_ascii_lowercase().as_str() {
            "website" => TaskDomain::Website,
            "business" => TaskDomain::Business,
            "education" => TaskDomain::Education,
            "personal" => TaskDomain::Personal,
            _ => TaskDomain::General,
        }
    }
}

impl fmt::Display for TaskDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
