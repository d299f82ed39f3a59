//! Prompt text and message assembly for each controller branch.

use ts_domain::insight::WebsiteInsight;
use ts_domain::task::{Task, TaskDomain};
use ts_domain::tool::{Message, Role};
use ts_sessions::Session;

use super::intent::READY_MARKER;

const QUESTIONING_PROMPT: &str = "\
You are TaskSmith, a planning assistant that turns a short conversation into exactly three \
actionable tasks. You are still gathering context.

Ask ONE short, specific clarifying question about the user's goal, constraints, timeline or \
resources. Do not propose tasks and do not use numbered lists.

If the user mentions a website, or a quick lookup would help, call the `research` tool with a \
`url` or a `query` before asking your question.";

const GENERATION_PROMPT: &str = "\
You are TaskSmith. Based on the conversation, produce exactly three actionable tasks that move \
the user toward their goal.

Respond with a JSON object of the form \
{\"tasks\": [{\"title\": \"...\", \"description\": \"...\", \"timeEstimate\": \"...\"}]}.
- title: starts with a verb, under 50 characters
- description: one to three concrete sentences
- timeEstimate: short, like \"2 hours\" or \"1 day\"
Do not ask questions and do not add any other keys.";

const EDIT_PROMPT: &str = "\
You revise a single task. Apply the user's instruction to the task below and respond with a \
JSON object {\"title\": \"...\", \"description\": \"...\", \"timeEstimate\": \"...\"}. \
The result must visibly differ from the original.";

const CONTINUE_PROMPT: &str = "\
You are TaskSmith. You already gave the user the three tasks listed below. Answer their latest \
message conversationally and briefly. Do not produce new tasks or rewrite the existing ones, \
and do not use numbered lists. If they want changes, tell them they can ask to edit a task \
by number or to start over.";

fn domain_line(domain: TaskDomain) -> String {
    format!("Topic area: {domain}.")
}

fn task_lines(tasks: &[Task]) -> String {
    tasks
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {} ({}): {}", i + 1, t.title, t.time_estimate, t.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn insight_block(insight: &WebsiteInsight) -> String {
    format!("Website analysis:\n{}", insight.summary())
}

/// User and assistant text only; tool bookkeeping is left out.
fn dialogue(session: &Session) -> impl Iterator<Item = Message> + '_ {
    session
        .transcript()
        .iter()
        .filter(|m| {
            m.tool_metadata.is_none()
                && matches!(m.role, Role::User | Role::Assistant)
                && !m.content.trim().is_empty()
        })
        .cloned()
}

/// Messages for a questioning turn: the full transcript, tool calls and
/// results included, so a follow-up call sees the research it asked for.
pub fn questioning(session: &Session) -> Vec<Message> {
    let mut system = format!(
        "{QUESTIONING_PROMPT}\n\nWhen you have enough context to plan, reply with exactly \
         {READY_MARKER} instead of a question.\n\n{}",
        domain_line(session.domain_or_general())
    );
    if let Some(insight) = session.website_insight() {
        system.push_str("\n\n");
        system.push_str(&insight_block(insight));
    }

    let mut messages = vec![Message::system(system)];
    messages.extend(session.transcript().iter().cloned());
    messages
}

/// Messages for task generation. `previous` carries the current tasks
/// when the user asked to change all of them.
pub fn generation(session: &Session, previous: Option<&[Task]>) -> Vec<Message> {
    let mut system = format!(
        "{GENERATION_PROMPT}\n\n{}",
        domain_line(session.domain_or_general())
    );
    if let Some(insight) = session.website_insight() {
        system.push_str(
            "\n\nGround the tasks in the website analysis below; address the most important \
             issues it shows.\n\n",
        );
        system.push_str(&insight_block(insight));
    }
    if let Some(tasks) = previous.filter(|t| !t.is_empty()) {
        system.push_str("\n\nThe user asked for changes to these tasks:\n");
        system.push_str(&task_lines(tasks));
    }

    let mut messages = vec![Message::system(system)];
    messages.extend(dialogue(session));
    messages
}

/// Messages for a single-task edit.
pub fn edit(original: &Task, instruction: &str) -> Vec<Message> {
    let original_json = serde_json::json!({
        "title": original.title,
        "description": original.description,
        "timeEstimate": original.time_estimate,
    });
    vec![
        Message::system(EDIT_PROMPT),
        Message::user(format!(
            "Original task:\n{original_json}\n\nInstruction: {}",
            instruction.trim()
        )),
    ]
}

/// Messages for ordinary conversation after tasks exist.
pub fn continuing(session: &Session, tasks: &[Task]) -> Vec<Message> {
    let system = format!("{CONTINUE_PROMPT}\n\nCurrent tasks:\n{}", task_lines(tasks));
    let mut messages = vec![Message::system(system)];
    messages.extend(dialogue(session));
    messages
}

/// Transcript entry recorded after a task set is surfaced.
pub fn task_summary(tasks: &[Task]) -> String {
    format!("Proposed tasks:\n{}", task_lines(tasks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_domain::tool::ToolCall;

    fn session() -> Session {
        let mut s = Session::new("s1");
        s.classify_once(TaskDomain::Website);
        s.push(Message::user("Help with https://example.com"));
        s.push(Message::assistant_tool_calls(
            "",
            &[ToolCall {
                call_id: "c1".into(),
                tool_name: "research".into(),
                arguments: serde_json::json!({"url": "https://example.com"}),
            }],
        ));
        s.push(Message::tool_result("c1", "research", "URL: https://example.com"));
        s.push(Message::assistant("Who is your audience?"));
        s
    }

    #[test]
    fn questioning_replays_tool_messages() {
        let msgs = questioning(&session());
        assert_eq!(msgs[0].role, Role::System);
        assert!(msgs[0].content.contains(READY_MARKER));
        assert!(msgs[0].content.contains("Topic area: website."));
        assert_eq!(msgs.len(), 5);
    }

    #[test]
    fn generation_uses_dialogue_and_insight() {
        let mut s = session();
        s.cache_insight(WebsiteInsight {
            url: "https://example.com".into(),
            status: 200,
            ..Default::default()
        });
        let msgs = generation(&s, None);
        assert!(msgs[0].content.contains("JSON"));
        assert!(msgs[0].content.contains("Website analysis:"));
        // system + user + plain assistant question
        assert_eq!(msgs.len(), 3);
        assert!(msgs.iter().all(|m| m.tool_metadata.is_none()));
    }

    #[test]
    fn regeneration_lists_previous_tasks() {
        let tasks = vec![Task::new("Fix titles", "Rewrite them.", "1 hour")];
        let msgs = generation(&session(), Some(&tasks));
        assert!(msgs[0].content.contains("1. Fix titles (1 hour): Rewrite them."));
    }

    #[test]
    fn edit_prompt_embeds_original() {
        let msgs = edit(&Task::new("Fix titles", "Rewrite them.", "1 hour"), " shorter ");
        assert_eq!(msgs.len(), 2);
        assert!(msgs[1].content.contains("\"timeEstimate\":\"1 hour\""));
        assert!(msgs[1].content.ends_with("Instruction: shorter"));
    }
}
