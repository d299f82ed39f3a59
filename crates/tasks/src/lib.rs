//! Task normalization pipeline.
//!
//! Everything in this crate is pure: model output goes in as text, a
//! canonical list of exactly three tasks (or a rendered list of clarifying
//! questions) comes out. No I/O, no shared state.
//!
//! - [`payload`] resolves the shapes a model reply can take.
//! - [`extract`] recovers tasks written as prose or markdown.
//! - [`questionnaire`] detects question lists disguised as tasks.
//! - [`normalize`] coerces and pads candidates into the canonical list.
//! - [`assemble`] enforces the outward `{tasks, reply}` contract.
//! - [`fallback`] holds the static per-domain task catalog.

macro_rules! regex {
    ($pattern:expr) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($pattern).expect("invalid static regex"))
    }};
}

pub mod assemble;
pub mod extract;
pub mod fallback;
pub mod normalize;
pub mod payload;
pub mod questionnaire;

pub use assemble::{
    assemble, assemble_dialogue, Assembly, AssemblyOutcome, TurnResponse, TASKS_READY_REPLY,
};
pub use extract::parse_tasks_from_text;
pub use fallback::{fallback_question, fallback_tasks, fallback_tasks_by_type};
pub use normalize::{coerce_task, normalize_tasks, TaskLimits};
pub use payload::ModelTaskPayload;
pub use questionnaire::{is_questionnaire, render_questions_reply, QuestionnaireScore};
