//! Pure heuristics over user and assistant text: domain classification,
//! readiness, and edit / start-over intent.

use ts_domain::config::ConversationConfig;
use ts_domain::task::{TaskDomain, CANONICAL_TASK_COUNT};

/// Marker the model emits instead of a question once it has enough context.
pub const READY_MARKER: &str = "[READY_FOR_TASKS]";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Domain classification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// First `http(s)://` or `www.` URL in `text`, with trailing punctuation
/// removed.
pub fn find_url(text: &str) -> Option<String> {
    let re = regex!(r"(?i)\b(?:https?://|www\.)[^\s<>()\[\]{}]+");
    re.find(text).map(|m| {
        m.as_str()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '"' | '\''))
            .to_string()
    })
}

/// Classify the topic of a message.
///
/// A URL forces `Website`; otherwise the domain with the most keyword hits
/// wins, ties going to the earlier domain in the table.
pub fn classify_domain(message: &str) -> TaskDomain {
    if find_url(message).is_some() || regex!(r"(?i)\b[a-z0-9-]+\.(?:com|org|net|io|dev|app|co)\b").is_match(message) {
        return TaskDomain::Website;
    }

    let tables: [(TaskDomain, &regex::Regex); 4] = [
        (
            TaskDomain::Website,
            regex!(r"(?i)\b(?:website|web\s?site|web\s?page|landing page|homepage|seo|search engine|google ranking|wordpress|shopify|wix|squarespace|domain name|page speed|blog)\w*"),
        ),
        (
            TaskDomain::Business,
            regex!(r"(?i)\b(?:business|startup|company|revenue|marketing|sales|customer|client|product launch|investor|profit|brand|entrepreneur|pricing|small shop|bakery|restaurant)\w*"),
        ),
        (
            TaskDomain::Education,
            regex!(r"(?i)\b(?:study|studying|learn|exam|course|school|university|college|homework|class(?:es)?\b|student|lesson|degree|thesis|curriculum|tutor)\w*"),
        ),
        (
            TaskDomain::Personal,
            regex!(r"(?i)\b(?:personal|habit|fitness|health|workout|diet|sleep|routine|productivity|hobby|hobbies|relationship|meditat|weight|self[- ]care|budgeting)\w*"),
        ),
    ];

    let mut best = (TaskDomain::General, 0usize);
    for (domain, re) in tables {
        let hits = re.find_iter(message).count();
        if hits > best.1 {
            best = (domain, hits);
        }
    }
    best.0
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Readiness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Why the controller decided (not) to generate tasks this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessReason {
    /// A previous turn already marked the session ready.
    AlreadyReady,
    ExplicitRequest,
    /// Enough user messages and enough assistant questions.
    Thresholds,
    /// One long, detailed message after at least one question.
    DetailedMessage,
    NotReady,
}

impl ReadinessReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessReason::AlreadyReady => "already_ready",
            ReadinessReason::ExplicitRequest => "explicit_request",
            ReadinessReason::Thresholds => "thresholds",
            ReadinessReason::DetailedMessage => "detailed_message",
            ReadinessReason::NotReady => "not_ready",
        }
    }

    pub fn is_ready(&self) -> bool {
        !matches!(self, ReadinessReason::NotReady)
    }
}

/// Inputs to the readiness decision, taken after the latest user message
/// was appended.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessInput<'a> {
    pub latest_message: &'a str,
    pub user_messages: usize,
    pub questions_asked: u32,
    /// The assistant's most recent message reads as a question.
    pub last_reply_asked: bool,
    pub already_ready: bool,
}

pub fn evaluate_readiness(input: &ReadinessInput<'_>, cfg: &ConversationConfig) -> ReadinessReason {
    if input.already_ready {
        return ReadinessReason::AlreadyReady;
    }
    if is_explicit_task_request(input.latest_message) {
        return ReadinessReason::ExplicitRequest;
    }
    let enough_messages = input.user_messages >= cfg.min_user_messages;
    if enough_messages && input.questions_asked >= cfg.min_questions {
        return ReadinessReason::Thresholds;
    }
    if enough_messages
        && input.questions_asked >= 1
        && input.last_reply_asked
        && word_count(input.latest_message) >= cfg.detailed_message_words
    {
        return ReadinessReason::DetailedMessage;
    }
    ReadinessReason::NotReady
}

/// High-confidence "give me the tasks" phrasing.
pub fn is_explicit_task_request(message: &str) -> bool {
    regex!(r"(?i)\b(?:generate|create|give me|make|show me|write|produce|list)\b[^.?!\n]{0,25}\btasks?\b").is_match(message)
        || regex!(r"(?i)\btasks?\s+(?:now|please)\b").is_match(message)
        || regex!(r"(?i)\b(?:go ahead|skip the questions|just (?:give|generate|create))\b").is_match(message)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Whether an assistant reply asks the user something.
pub fn is_question(reply: &str) -> bool {
    let t = reply
        .trim()
        .trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | '*' | ' '));
    t.ends_with('?')
        || regex!(r"(?im)(?:^|[.!:]\s+)(?:could you|can you|would you|will you|do you|did you|are you|have you|what|how|which|when|where|why|who|tell me|please share|let me know)\b")
            .is_match(t)
}

/// Whether the reply carries the readiness marker.
pub fn has_ready_marker(reply: &str) -> bool {
    reply.contains(READY_MARKER)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Post-generation intent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What a user message asks for once a task set exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Forget the current tasks and plan something new.
    StartOver,
    /// Change the task at this 0-based index, or all of them.
    Edit { target_index: Option<usize> },
    /// Ordinary conversation about the existing tasks.
    Continue,
}

pub fn classify_follow_up(message: &str) -> FollowUp {
    if is_start_over(message) {
        return FollowUp::StartOver;
    }
    let ordinal = task_ordinal(message);
    if has_edit_verb(message) || ordinal.is_some() {
        return FollowUp::Edit {
            target_index: ordinal,
        };
    }
    FollowUp::Continue
}

pub fn is_start_over(message: &str) -> bool {
    regex!(r"(?i)\b(?:new project|start over|start again|start fresh|from scratch|different (?:project|topic|goal)|another project|something (?:else|different) entirely|reset)\b")
        .is_match(message)
}

fn has_edit_verb(message: &str) -> bool {
    regex!(r"(?i)\b(?:edit|change|modify|update|revise|adjust|fix|rewrite|tweak|replace|rephrase)\b")
        .is_match(message)
}

/// 0-based index of the task a message refers to, if it names one of the
/// three.
pub fn task_ordinal(message: &str) -> Option<usize> {
    let numbered = regex!(r"(?i)\b(?:task|number|item|no\.?)\s*#?\s*(\d+)\b|#(\d+)\b");
    let worded = regex!(r"(?i)\b(first|second|third|1st|2nd|3rd|last)\s+(?:task|one|item)\b");
    let bare = regex!(r"^\s*#?(\d+)\s*[.!)]?\s*$");

    let n = if let Some(c) = numbered.captures(message) {
        c.get(1).or_else(|| c.get(2))?.as_str().parse::<usize>().ok()?
    } else if let Some(c) = worded.captures(message) {
        match c[1].to_ascii_lowercase().as_str() {
            "first" | "1st" => 1,
            "second" | "2nd" => 2,
            "third" | "3rd" | "last" => 3,
            _ => return None,
        }
    } else if let Some(c) = bare.captures(message) {
        c[1].parse::<usize>().ok()?
    } else {
        return None;
    };

    (1..=CANONICAL_TASK_COUNT).contains(&n).then(|| n - 1)
}
