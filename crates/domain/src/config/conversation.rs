use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Conversation tuning
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Thresholds and limits for the conversation state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// User turns required before tasks may be generated without an
    /// explicit request.
    #[serde(default = "d_2usize")]
    pub min_user_messages: usize,
    /// Clarifying questions the assistant must have asked first.
    #[serde(default = "d_2u32")]
    pub min_questions: u32,
    /// A user message at least this many words long counts as enough
    /// context once one question has been asked.
    #[serde(default = "d_100")]
    pub detailed_message_words: usize,
    /// Deadline raced against the generation and edit completions.
    #[serde(default = "d_15000")]
    pub generation_timeout_ms: u64,
    /// Extracted titles longer than this are treated as mis-captured prose.
    #[serde(default = "d_50")]
    pub max_title_chars: usize,
    /// Time estimates longer than this are replaced by the default.
    #[serde(default = "d_20")]
    pub max_time_estimate_chars: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            min_user_messages: 2,
            min_questions: 2,
            detailed_message_words: 100,
            generation_timeout_ms: 15_000,
            max_title_chars: 50,
            max_time_estimate_chars: 20,
        }
    }
}

fn d_2usize() -> usize {
    2
}
fn d_2u32() -> u32 {
    2
}
fn d_100() -> usize {
    100
}
fn d_15000() -> u64 {
    15_000
}
fn d_50() -> usize {
    50
}
fn d_20() -> usize {
    20
}
