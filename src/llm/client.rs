//! LLM client abstraction
//!
//! Answers are produced by an external model server. The rest of the
//! application only sees [`LLMClient`], so tests can substitute a canned
//! client and the Ollama implementation stays in one place.

use crate::types::Result;
use async_trait::async_trait;

/// Generic LLM client trait for provider abstraction
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}
