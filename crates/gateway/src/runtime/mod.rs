//! Conversation runtime: the controller state machine plus the pure
//! heuristics, prompts, tool dispatch and per-session locking it uses.
//!
//! Entry point: [`ConversationController::handle_message`] takes a session
//! id and a user message and returns the assembled `{tasks, reply}`.

pub mod controller;
pub mod intent;
pub mod prompts;
pub mod session_lock;
pub mod tools;

pub use controller::ConversationController;
pub use session_lock::{SessionBusy, SessionLockMap};
