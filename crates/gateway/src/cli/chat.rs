//! `tasksmith chat`: interactive REPL.
//!
//! Each line goes through the conversation controller exactly like a
//! `POST /chat` would. Slash commands manage the session.

use std::sync::Arc;

use ts_domain::config::Config;
use ts_sessions::InMemorySessionStore;

use super::run::render_turn;
use crate::bootstrap;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat REPL.
pub async fn chat(config: Arc<Config>, session_id: Option<String>) -> anyhow::Result<()> {
    let state = bootstrap::build_app_state(config)?;
    let mut session_id = session_id.unwrap_or_else(InMemorySessionStore::new_session_id);

    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".tasksmith")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    // Welcome goes to stderr so stdout carries only conversation output.
    eprintln!("TaskSmith interactive chat");
    eprintln!("Session: {session_id}  |  Type /help for commands, Ctrl+D to exit");
    eprintln!();

    loop {
        match rl.readline("you> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    if handle_slash_command(&state, trimmed, &mut session_id).await {
                        break;
                    }
                    continue;
                }

                match state.controller.handle_message(&session_id, trimmed).await {
                    Ok(turn) => println!("{}", render_turn(&turn)),
                    Err(e) => eprintln!("\x1B[31merror: {e}\x1B[0m"),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What a slash command asks the REPL to do.
#[derive(Debug, PartialEq, Eq)]
enum Slash<'a> {
    Exit,
    New,
    Session(Option<&'a str>),
    Tasks,
    Help,
    Unknown(&'a str),
}

fn parse_slash(input: &str) -> Slash<'_> {
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());
    match cmd {
        "/exit" | "/quit" => Slash::Exit,
        "/new" | "/reset" => Slash::New,
        "/session" => Slash::Session(arg),
        "/tasks" => Slash::Tasks,
        "/help" => Slash::Help,
        other => Slash::Unknown(other),
    }
}

/// Process a slash command. Returns `true` if the REPL should exit.
async fn handle_slash_command(state: &AppState, input: &str, session_id: &mut String) -> bool {
    match parse_slash(input) {
        Slash::Exit => return true,

        Slash::New => {
            if let Err(e) = state.controller.clear(session_id).await {
                eprintln!("\x1B[31merror: {e}\x1B[0m");
            }
            *session_id = InMemorySessionStore::new_session_id();
            eprintln!("Started a new session: {session_id}");
        }

        Slash::Session(Some(id)) => {
            *session_id = id.to_string();
            eprintln!("Session switched to: {session_id}");
        }
        Slash::Session(None) => {
            eprintln!("Current session: {session_id}");
            eprintln!("Usage: /session <id>");
        }

        Slash::Tasks => match state.sessions.get(session_id).and_then(|s| s.last_task_set) {
            Some(tasks) if !tasks.is_empty() => {
                for (i, t) in tasks.iter().enumerate() {
                    println!("{}. {}  [{}]", i + 1, t.title, t.time_estimate);
                }
            }
            _ => eprintln!("No tasks yet."),
        },

        Slash::Help => {
            eprintln!("Commands:");
            eprintln!("  /new             Forget this session and start a new one");
            eprintln!("  /session <id>    Switch to another session");
            eprintln!("  /tasks           Show the current tasks");
            eprintln!("  /exit, /quit     Exit the chat");
            eprintln!("  /help            Show this help");
        }

        Slash::Unknown(other) => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_commands() {
        assert_eq!(parse_slash("/exit"), Slash::Exit);
        assert_eq!(parse_slash("/reset"), Slash::New);
        assert_eq!(parse_slash("/session  abc "), Slash::Session(Some("abc")));
        assert_eq!(parse_slash("/session"), Slash::Session(None));
        assert_eq!(parse_slash("/bogus x"), Slash::Unknown("/bogus"));
    }
}
