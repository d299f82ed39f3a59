//! Detect clarifying questions that a model emitted as tasks.
//!
//! The scoring is deliberately overlapping: thin task bodies are the
//! strongest sign that the model asked questions instead of planning, so
//! several independent rules can each tip a list into "questionnaire".

use regex::Regex;
use ts_domain::task::{Task, CANONICAL_TASK_COUNT};

/// First line of every rendered question list.
pub const QUESTIONNAIRE_INTRO: &str =
    "Before I can put together your tasks, I need a little more information:";

/// Invitation appended after a rendered question list.
pub const QUESTIONNAIRE_OUTRO: &str =
    "Once you share these details, I'll turn them into three concrete tasks for you.";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Signatures
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn interrogative_start_re() -> &'static Regex {
    regex!(r"(?i)^(?:what|how|which|who|whom|whose|where|when|why)\b")
}

fn auxiliary_pronoun_re() -> &'static Regex {
    regex!(r"(?i)\b(?:do|does|did|can|could|would|will|should|shall|are|is|have|has)\s+(?:you|we|i|they|your)\b")
}

fn imperative_start_re() -> &'static Regex {
    regex!(r"(?i)^(?:create|build|develop|implement|set\s*up|configure|optimi[sz]e|improve|fix|add|remove|update|modify)\b")
}

fn step_re() -> &'static Regex {
    regex!(r"(?i)\bstep\s+\d+")
}

fn time_unit_re() -> &'static Regex {
    regex!(r"(?i)\b(?:minutes?|mins?|hours?|hrs?|days?|weeks?|months?)\b")
}

fn by_method_re() -> &'static Regex {
    regex!(r"(?i)\bby\s+(?:using|implementing|adding|following)\b")
}

fn user_reference_re() -> &'static Regex {
    regex!(r"(?i)\byour\b|\byou\s")
}

fn command_start_re() -> &'static Regex {
    regex!(r"(?i)^(?:please\s+)?(?:tell|share|describe|explain|list|provide|give|send|confirm|specify|let me know)\b")
}

/// Ends in `?`, starts with an interrogative, pairs an auxiliary verb with
/// a pronoun, or asks the user to tell/let us know something.
pub fn is_strong_question(title: &str) -> bool {
    let t = title.trim();
    if t.is_empty() {
        return false;
    }
    let lower = t.to_lowercase();
    t.ends_with('?')
        || interrogative_start_re().is_match(t)
        || auxiliary_pronoun_re().is_match(t)
        || lower.contains("tell me")
        || lower.contains("let me know")
}

fn has_action_signature(text: &str) -> bool {
    let t = text.trim();
    imperative_start_re().is_match(t)
        || step_re().is_match(t)
        || time_unit_re().is_match(t)
        || by_method_re().is_match(t)
}

fn is_user_query(task: &Task) -> bool {
    let title = task.title.trim();
    user_reference_re().is_match(title)
        && !title.to_lowercase().contains("should")
        && task.description.trim().chars().count() < 20
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scoring
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-rule counts over the first three candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestionnaireScore {
    pub total: usize,
    pub question_count: usize,
    pub task_count: usize,
    pub user_query_count: usize,
    /// Every description is shorter than 30 characters.
    pub all_thin: bool,
}

impl QuestionnaireScore {
    pub fn of(candidates: &[Task]) -> Self {
        let considered = &candidates[..candidates.len().min(CANONICAL_TASK_COUNT)];
        let mut score = Self {
            total: considered.len(),
            all_thin: !considered.is_empty(),
            ..Default::default()
        };
        for task in considered {
            if is_strong_question(&task.title) {
                score.question_count += 1;
            }
            if has_action_signature(&task.title) || has_action_signature(&task.description) {
                score.task_count += 1;
            }
            if is_user_query(task) {
                score.user_query_count += 1;
            }
            if task.description.trim().chars().count() >= 30 {
                score.all_thin = false;
            }
        }
        score
    }

    fn question_signals(&self) -> usize {
        self.question_count + self.user_query_count
    }

    pub fn is_questionnaire(&self) -> bool {
        if self.total == 0 {
            return false;
        }
        let signals = self.question_signals();
        signals > self.task_count
            || signals >= self.total.div_ceil(2)
            || (self.all_thin && signals > 0)
    }
}

/// Whether the candidate list is really a list of clarifying questions.
pub fn is_questionnaire(candidates: &[Task]) -> bool {
    QuestionnaireScore::of(candidates).is_questionnaire()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn as_question(text: &str) -> String {
    let t = text.trim().trim_end_matches(':').trim_end();
    if t.ends_with(&['?', '.', '!'][..]) || command_start_re().is_match(t) {
        t.to_string()
    } else {
        format!("{t}?")
    }
}

/// Render question candidates as a numbered conversational reply.
pub fn render_questions_reply(candidates: &[Task]) -> String {
    let questions: Vec<String> = candidates
        .iter()
        .take(CANONICAL_TASK_COUNT)
        .filter_map(|task| {
            let text = if task.title.trim().is_empty() {
                task.description.trim()
            } else {
                task.title.trim()
            };
            (!text.is_empty()).then(|| as_question(text))
        })
        .collect();

    let mut reply = String::from(QUESTIONNAIRE_INTRO);
    reply.push_str("\n\n");
    if questions.is_empty() {
        reply.push_str("1. What would you like to achieve?");
    } else {
        for (i, q) in questions.iter().enumerate() {
            if i > 0 {
                reply.push('\n');
            }
            reply.push_str(&format!("{}. {q}", i + 1));
        }
    }
    reply.push_str("\n\n");
    reply.push_str(QUESTIONNAIRE_OUTRO);
    reply
}

/// Whether `reply` is a question list produced by [`render_questions_reply`].
pub fn is_rendered_questions(reply: &str) -> bool {
    reply.trim_start().starts_with(QUESTIONNAIRE_INTRO)
}
