//! LLM provider abstraction layer.
//!
//! Playlist generation only needs single-shot chat completions that return
//! a JSON object, so the abstraction is a message list in and text out.

mod openai;
mod provider;
mod types;

pub use openai::{ApiKeySource, OpenAIProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
pub use provider::{CompletionOptions, LlmError, LlmProvider, ResponseFormat};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage};
