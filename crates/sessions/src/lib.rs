//! Session state for TaskSmith conversations.
//!
//! A [`Session`] holds the transcript, the classified task domain, the
//! progress flags that drive the conversation state machine, the cached
//! website insight and the most recent canonical task set. Sessions live
//! behind the [`SessionStore`] trait; the bundled implementation keeps
//! them in process memory only.

pub mod session;
pub mod store;

pub use session::{EditRequest, Progress, Session};
pub use store::{InMemorySessionStore, SessionStore};
