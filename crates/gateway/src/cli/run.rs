//! `tasksmith run`: one-shot turn.
//!
//! Sends a single message through the conversation controller, prints the
//! reply and any tasks, and exits. Useful for scripting and quick checks.

use std::sync::Arc;

use ts_domain::config::Config;
use ts_tasks::TurnResponse;

use crate::api::chat::ChatReply;
use crate::bootstrap;

/// Execute a single turn and print the response.
pub async fn run(
    config: Arc<Config>,
    message: String,
    session_id: String,
    json_output: bool,
) -> anyhow::Result<()> {
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("message must not be empty");
    }

    let state = bootstrap::build_app_state(config)?;
    let turn = state.controller.handle_message(&session_id, message).await?;

    if json_output {
        let reply = ChatReply {
            session_id,
            tasks: turn.tasks,
            reply: turn.reply,
        };
        let json = serde_json::to_string_pretty(&reply)
            .map_err(|e| anyhow::anyhow!("serializing response: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", render_turn(&turn));
    }
    Ok(())
}

/// Human-readable rendering of a turn: the reply, then numbered tasks.
pub fn render_turn(turn: &TurnResponse) -> String {
    let mut out = String::new();
    if let Some(reply) = &turn.reply {
        out.push_str(reply.trim_end());
        out.push('\n');
    }
    if !turn.tasks.is_empty() {
        out.push('\n');
        for (i, task) in turn.tasks.iter().enumerate() {
            out.push_str(&format!(
                "{}. {}  [{}]\n   {}\n",
                i + 1,
                task.title,
                task.time_estimate,
                task.description
            ));
        }
    }
    out
}
