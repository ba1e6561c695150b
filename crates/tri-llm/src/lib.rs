//! # tri-llm
//!
//! The language model port used for table selection, query synthesis, and
//! summarization, plus an adapter for OpenAI-compatible chat completion APIs.
//!
//! The port is deliberately loose: prompt text in, completion text out. Any
//! structure the engine needs (table names, fenced SQL) is recovered by the
//! caller from the returned text.

mod error;
mod http;
mod openai;

pub use error::LlmError;
pub use openai::OpenAiClient;

use async_trait::async_trait;

/// A text-completion model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete `prompt` at the given sampling temperature.
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, LlmError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}
