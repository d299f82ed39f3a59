//! Language model gateway: the provider trait and the OpenAI-compatible
//! chat completions adapter.

pub mod openai_compat;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use openai_compat::OpenAiCompatProvider;
pub use traits::{ChatRequest, ChatResponse, LlmProvider, Usage};
pub use util::resolve_api_key;
