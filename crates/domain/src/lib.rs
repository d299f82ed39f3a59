//! Shared types for TaskSmith: errors, chat messages, tasks, website
//! insight, configuration and structured trace events.

pub mod config;
pub mod error;
pub mod insight;
pub mod task;
pub mod tool;
pub mod trace;
