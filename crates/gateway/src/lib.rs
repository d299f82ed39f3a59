//! TaskSmith gateway: conversation runtime, website insight, HTTP API and CLI.

macro_rules! regex {
    ($pattern:expr) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($pattern).expect("invalid static regex"))
    }};
}

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod cors;
pub mod insight;
pub mod runtime;
pub mod state;
