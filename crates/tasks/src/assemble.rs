//! Final pass over a turn's `{tasks, reply}` before it leaves the core.
//!
//! Guarantees: `tasks` is always present and holds either zero or exactly
//! three well-formed entries; tasks that are really questions are never
//! surfaced as tasks; and assembling an already assembled response changes
//! nothing.

use serde::{Deserialize, Serialize};
use ts_domain::task::{Task, TaskDomain, CANONICAL_TASK_COUNT};

use crate::extract::parse_tasks_from_text;
use crate::normalize::{normalize_tasks, TaskLimits};
use crate::questionnaire::{is_questionnaire, is_rendered_questions, render_questions_reply};

/// Reply that accompanies a freshly surfaced task list.
pub const TASKS_READY_REPLY: &str =
    "Here are your three tasks. Let me know if you'd like to change any of them.";

/// Outward shape of one conversation turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResponse {
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub reply: Option<String>,
}

impl TurnResponse {
    pub fn tasks(tasks: Vec<Task>) -> Self {
        Self { tasks, reply: None }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            tasks: Vec::new(),
            reply: Some(text.into()),
        }
    }
}

/// What the assembled response turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// Exactly three canonical tasks.
    Tasks,
    /// A list of clarifying questions in `reply`; no tasks.
    Questions,
    /// Plain reply text passed through unchanged; no tasks.
    Reply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub response: TurnResponse,
    pub outcome: AssemblyOutcome,
}

/// Enforce the response contract on a raw controller result.
///
/// Missing tasks are padded from the `domain` fallback catalog.
pub fn assemble(raw: TurnResponse, domain: TaskDomain, limits: TaskLimits) -> Assembly {
    if raw.tasks.is_empty() {
        return assemble_reply_only(raw.reply, domain, limits);
    }

    let candidates: Vec<Task> = raw.tasks.into_iter().take(CANONICAL_TASK_COUNT).collect();
    if is_questionnaire(&candidates) {
        tracing::debug!(candidates = candidates.len(), "task candidates read as questions");
        return Assembly {
            response: TurnResponse::reply(render_questions_reply(&candidates)),
            outcome: AssemblyOutcome::Questions,
        };
    }
    tasks_assembly(candidates, domain, limits)
}

/// Enforce the response contract on a conversational turn.
///
/// The reply is passed through unchanged. Lists inside it are never lifted
/// into `tasks`, so a chatty answer cannot stand in for a generated set.
pub fn assemble_dialogue(reply: Option<String>) -> Assembly {
    let outcome = match reply.as_deref() {
        Some(text) if is_rendered_questions(text) => AssemblyOutcome::Questions,
        _ => AssemblyOutcome::Reply,
    };
    Assembly {
        response: TurnResponse {
            tasks: Vec::new(),
            reply,
        },
        outcome,
    }
}

fn assemble_reply_only(reply: Option<String>, domain: TaskDomain, limits: TaskLimits) -> Assembly {
    let passthrough = |reply: Option<String>, outcome| Assembly {
        response: TurnResponse {
            tasks: Vec::new(),
            reply,
        },
        outcome,
    };

    let Some(text) = reply else {
        return passthrough(None, AssemblyOutcome::Reply);
    };
    if is_rendered_questions(&text) {
        return passthrough(Some(text), AssemblyOutcome::Questions);
    }

    match parse_tasks_from_text(&text, limits) {
        Some(candidates) if is_questionnaire(&candidates) => {
            passthrough(Some(text), AssemblyOutcome::Questions)
        }
        Some(candidates) => {
            tracing::debug!(candidates = candidates.len(), "recovered tasks from reply text");
            tasks_assembly(candidates, domain, limits)
        }
        None => passthrough(Some(text), AssemblyOutcome::Reply),
    }
}

fn tasks_assembly(candidates: Vec<Task>, domain: TaskDomain, limits: TaskLimits) -> Assembly {
    Assembly {
        response: TurnResponse {
            tasks: normalize_tasks(candidates, domain, limits),
            reply: Some(TASKS_READY_REPLY.to_string()),
        },
        outcome: AssemblyOutcome::Tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questionnaire::QUESTIONNAIRE_INTRO;

    fn run(raw: TurnResponse) -> Assembly {
        assemble(raw, TaskDomain::Website, TaskLimits::default())
    }

    #[test]
    fn tasks_replace_reply_with_confirmation() {
        let out = run(TurnResponse {
            tasks: vec![Task::new("Fix titles", "Rewrite the title tags on all pages.", "2 hours")],
            reply: Some("Task 1: Fix titles ...".into()),
        });
        assert_eq!(out.outcome, AssemblyOutcome::Tasks);
        assert_eq!(out.response.tasks.len(), 3);
        assert_eq!(out.response.reply.as_deref(), Some(TASKS_READY_REPLY));
    }

    #[test]
    fn question_tasks_become_rendered_reply() {
        let out = run(TurnResponse::tasks(vec![
            Task::new("What is your URL?", "", ""),
            Task::new("Who visits the site?", "", ""),
        ]));
        assert_eq!(out.outcome, AssemblyOutcome::Questions);
        assert!(out.response.tasks.is_empty());
        let reply = out.response.reply.unwrap();
        assert!(reply.starts_with(QUESTIONNAIRE_INTRO));
        assert!(reply.contains("2. Who visits the site?"));
    }

    #[test]
    fn tasks_embedded_in_reply_are_extracted() {
        let out = run(TurnResponse::reply(
            "Task 1: Compress images\nTime Estimate: 2 hours\nShrink the hero banner and product shots.\n\nTask 2: Add alt text\nDescribe every image for screen readers and search engines.",
        ));
        assert_eq!(out.outcome, AssemblyOutcome::Tasks);
        assert_eq!(out.response.tasks.len(), 3);
        assert_eq!(out.response.tasks[0].time_estimate, "2 hours");
        assert_eq!(out.response.tasks[1].id, Some(2));
    }

    #[test]
    fn extracted_questions_leave_reply_untouched() {
        let text = "A few things first:\n1. What is your budget?\n2. When do you want to launch?";
        let out = run(TurnResponse::reply(text));
        assert_eq!(out.outcome, AssemblyOutcome::Questions);
        assert!(out.response.tasks.is_empty());
        assert_eq!(out.response.reply.as_deref(), Some(text));
    }

    #[test]
    fn plain_reply_passes_through() {
        let out = run(TurnResponse::reply("What is the address of your site?"));
        assert_eq!(out.outcome, AssemblyOutcome::Reply);
        assert_eq!(
            out.response,
            TurnResponse::reply("What is the address of your site?")
        );
    }

    #[test]
    fn reassembly_is_a_no_op() {
        let inputs = vec![
            TurnResponse::tasks(vec![Task::new("Build a blog", "", "")]),
            TurnResponse::tasks(vec![
                Task::new("What is your audience", "", ""),
                Task::new("Your budget", "", ""),
                Task::new("Describe your goals for this project in detail please", "", ""),
            ]),
            TurnResponse::reply("1. Optimize images\n2. Fix links\n\nThanks!"),
            TurnResponse::reply("How can I help?"),
            TurnResponse::default(),
        ];
        for raw in inputs {
            let once = run(raw).response;
            let twice = run(once.clone()).response;
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn dialogue_keeps_numbered_lists_as_text() {
        let text = "Good question. In order:\n1. Rewrite the homepage title\n2. Compress product photos";
        let out = assemble_dialogue(Some(text.into()));
        assert_eq!(out.outcome, AssemblyOutcome::Reply);
        assert!(out.response.tasks.is_empty());
        assert_eq!(out.response.reply.as_deref(), Some(text));

        let again = assemble_dialogue(out.response.reply.clone());
        assert_eq!(again, out);
    }

    #[test]
    fn serializes_null_reply_and_empty_tasks() {
        let json = serde_json::to_value(TurnResponse::default()).unwrap();
        assert_eq!(json["tasks"], serde_json::json!([]));
        assert!(json["reply"].is_null());
    }
}
