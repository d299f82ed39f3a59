//! Coercion and padding into the canonical three-task list.

use ts_domain::config::ConversationConfig;
use ts_domain::task::{
    Task, TaskDomain, CANONICAL_TASK_COUNT, DEFAULT_TIME_ESTIMATE, NO_DESCRIPTION, UNTITLED_TASK,
};

use crate::fallback::fallback_task_at;

/// Length limits applied while extracting and coercing tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLimits {
    /// Extracted titles longer than this are replaced by `Task {n}`.
    pub max_title_chars: usize,
    /// Time estimates longer than this are replaced by the default.
    pub max_time_estimate_chars: usize,
}

impl Default for TaskLimits {
    fn default() -> Self {
        Self {
            max_title_chars: 50,
            max_time_estimate_chars: 20,
        }
    }
}

impl From<&ConversationConfig> for TaskLimits {
    fn from(cfg: &ConversationConfig) -> Self {
        Self {
            max_title_chars: cfg.max_title_chars,
            max_time_estimate_chars: cfg.max_time_estimate_chars,
        }
    }
}

/// Coerce one task at 0-based `position` into a well-formed record.
///
/// Applying this twice gives the same result as applying it once.
pub fn coerce_task(task: Task, position: usize, limits: TaskLimits) -> Task {
    let title = task.title.trim();
    let description = task.description.trim();
    let estimate = task.time_estimate.trim();

    let time_estimate = if estimate.is_empty()
        || estimate.chars().count() > limits.max_time_estimate_chars
    {
        DEFAULT_TIME_ESTIMATE
    } else {
        estimate
    };

    Task {
        id: Some(position as u32 + 1),
        title: if title.is_empty() { UNTITLED_TASK } else { title }.to_string(),
        description: if description.is_empty() {
            NO_DESCRIPTION
        } else {
            description
        }
        .to_string(),
        time_estimate: time_estimate.to_string(),
    }
}

/// Turn any candidate list into exactly three coerced tasks.
///
/// Longer lists are truncated; shorter lists are padded with the domain's
/// fallback entries at the missing positions.
pub fn normalize_tasks(candidates: Vec<Task>, domain: TaskDomain, limits: TaskLimits) -> Vec<Task> {
    let mut tasks: Vec<Task> = candidates
        .into_iter()
        .take(CANONICAL_TASK_COUNT)
        .enumerate()
        .map(|(i, t)| coerce_task(t, i, limits))
        .collect();

    for i in tasks.len()..CANONICAL_TASK_COUNT {
        tasks.push(fallback_task_at(domain, i));
    }
    tasks
}
