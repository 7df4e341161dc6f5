//! Symbiotica Completion - large-language-model client
//!
//! One call path for every endpoint that needs generated text: a system
//! instruction plus a user prompt in, the first choice's text out.

mod error;
mod openai;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;

pub use error::CompletionError;
pub use openai::{CompletionConfig, OpenAICompletionClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

pub type CompletionResult<T> = Result<T, CompletionError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> CompletionResult<Completion>;
}
