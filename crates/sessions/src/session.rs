use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ts_domain::insight::WebsiteInsight;
use ts_domain::task::{Task, TaskDomain};
use ts_domain::tool::{Message, Role};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Progress flags
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Conversation progress.
///
/// Within one question/generate cycle every field only moves forward:
/// `questions_asked` increments, the two flags flip false→true. The only
/// ways back are [`Progress::complete_generation`] (which opens a new
/// cycle) and [`Progress::start_over`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    questions_asked: u32,
    ready_for_tasks: bool,
    tasks_generated: bool,
}

impl Progress {
    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn ready_for_tasks(&self) -> bool {
        self.ready_for_tasks
    }

    pub fn tasks_generated(&self) -> bool {
        self.tasks_generated
    }

    pub fn record_question(&mut self) {
        self.questions_asked = self.questions_asked.saturating_add(1);
    }

    pub fn mark_ready(&mut self) {
        self.ready_for_tasks = true;
    }

    /// Tasks exist now; reset the question counters so a later
    /// "new project" request starts a fresh cycle.
    pub fn complete_generation(&mut self) {
        self.tasks_generated = true;
        self.questions_asked = 0;
        self.ready_for_tasks = false;
    }

    /// Explicit "start over": forget that tasks were generated.
    pub fn start_over(&mut self) {
        self.tasks_generated = false;
        self.ready_for_tasks = false;
    }
}

/// A pending request to edit the current task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    /// 0-based index of the task to edit; `None` means regenerate all.
    pub target_index: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Append-only dialogue, replayed to the model in order.
    transcript: Vec<Message>,
    /// Classified from the first user message, then fixed.
    domain: Option<TaskDomain>,
    pub progress: Progress,
    website_insight: Option<WebsiteInsight>,
    pub last_task_set: Option<Vec<Task>>,
    pub edit_request: Option<EditRequest>,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            created_at: now,
            updated_at: now,
            transcript: Vec::new(),
            domain: None,
            progress: Progress::default(),
            website_insight: None,
            last_task_set: None,
            edit_request: None,
        }
    }

    // ── Transcript ─────────────────────────────────────────────────

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn push(&mut self, message: Message) {
        self.transcript.push(message);
        self.updated_at = Utc::now();
    }

    pub fn user_message_count(&self) -> usize {
        self.transcript.iter().filter(|m| m.role == Role::User).count()
    }

    /// The most recent assistant message with visible text.
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.content.trim().is_empty())
            .map(|m| m.content.as_str())
    }

    // ── Domain ─────────────────────────────────────────────────────

    pub fn domain(&self) -> Option<TaskDomain> {
        self.domain
    }

    /// The classified domain, or `General` before classification.
    pub fn domain_or_general(&self) -> TaskDomain {
        self.domain.unwrap_or(TaskDomain::General)
    }

    /// Set the domain if it has not been set yet. Returns `true` when this
    /// call performed the classification.
    pub fn classify_once(&mut self, domain: TaskDomain) -> bool {
        if self.domain.is_some() {
            return false;
        }
        self.domain = Some(domain);
        true
    }

    // ── Website insight ────────────────────────────────────────────

    pub fn website_insight(&self) -> Option<&WebsiteInsight> {
        self.website_insight.as_ref()
    }

    /// Cache an insight unless one is already cached. Returns `true` when
    /// stored.
    pub fn cache_insight(&mut self, insight: WebsiteInsight) -> bool {
        if self.website_insight.is_some() {
            return false;
        }
        self.website_insight = Some(insight);
        true
    }

    // ── Tasks ──────────────────────────────────────────────────────

    pub fn has_tasks(&self) -> bool {
        self.progress.tasks_generated()
            && self.last_task_set.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Record a freshly generated canonical task set.
    pub fn store_generated_tasks(&mut self, tasks: Vec<Task>) {
        self.last_task_set = Some(tasks);
        self.edit_request = None;
        self.progress.complete_generation();
        self.updated_at = Utc::now();
    }

    /// Swap one task of the current set, leaving the others untouched.
    /// Returns the task that was replaced.
    pub fn replace_task(&mut self, index: usize, task: Task) -> Option<Task> {
        let slot = self.last_task_set.as_mut()?.get_mut(index)?;
        let previous = std::mem::replace(slot, task);
        self.edit_request = None;
        self.updated_at = Utc::now();
        Some(previous)
    }

    /// Drop the generated state for an explicit "start over". The
    /// transcript is kept as context for the next generation.
    pub fn start_over(&mut self) {
        self.progress.start_over();
        self.edit_request = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_fixed_after_first_classification() {
        let mut s = Session::new("s1");
        assert!(s.classify_once(TaskDomain::Website));
        assert!(!s.classify_once(TaskDomain::Business));
        assert_eq!(s.domain(), Some(TaskDomain::Website));
    }

    #[test]
    fn insight_is_cached_once() {
        let mut s = Session::new("s1");
        let first = WebsiteInsight {
            url: "https://a.com".into(),
            ..Default::default()
        };
        let second = WebsiteInsight {
            url: "https://b.com".into(),
            ..Default::default()
        };
        assert!(s.cache_insight(first));
        assert!(!s.cache_insight(second));
        assert_eq!(s.website_insight().unwrap().url, "https://a.com");
    }

    #[test]
    fn generation_resets_question_cycle() {
        let mut s = Session::new("s1");
        s.progress.record_question();
        s.progress.record_question();
        s.progress.mark_ready();
        s.store_generated_tasks(vec![Task::new("a", "b", "1 hour")]);
        assert!(s.progress.tasks_generated());
        assert_eq!(s.progress.questions_asked(), 0);
        assert!(!s.progress.ready_for_tasks());
        assert!(s.has_tasks());
    }

    #[test]
    fn replace_task_touches_one_slot() {
        let mut s = Session::new("s1");
        assert!(s.replace_task(0, Task::new("x", "y", "1 hour")).is_none());

        let tasks: Vec<Task> = (1..=3)
            .map(|i| Task::new(format!("t{i}"), "d", "1 hour").with_id(i))
            .collect();
        s.store_generated_tasks(tasks.clone());
        s.edit_request = Some(EditRequest {
            target_index: Some(1),
        });

        let old = s.replace_task(1, Task::new("new", "d", "2 hours").with_id(2));
        assert_eq!(old.as_ref(), Some(&tasks[1]));
        let current = s.last_task_set.as_ref().unwrap();
        assert_eq!(current[0], tasks[0]);
        assert_eq!(current[2], tasks[2]);
        assert_eq!(current[1].title, "new");
        assert!(s.edit_request.is_none());
        assert!(s.replace_task(3, Task::new("x", "y", "1 hour")).is_none());
    }

    #[test]
    fn start_over_keeps_transcript() {
        let mut s = Session::new("s1");
        s.push(Message::user("build me a site"));
        s.store_generated_tasks(vec![Task::new("a", "b", "1 hour")]);
        s.edit_request = Some(EditRequest { target_index: Some(1) });
        s.start_over();
        assert!(!s.progress.tasks_generated());
        assert!(s.edit_request.is_none());
        assert_eq!(s.transcript().len(), 1);
    }

    #[test]
    fn counts_user_messages_and_finds_last_assistant_text() {
        let mut s = Session::new("s1");
        s.push(Message::user("one"));
        s.push(Message::assistant("What is it?"));
        s.push(Message::assistant_tool_calls("", &[]));
        s.push(Message::user("two"));
        assert_eq!(s.user_message_count(), 2);
        assert_eq!(s.last_assistant_text(), Some("What is it?"));
    }
}
