//! Mock implementations for testing.
//!
//! Stand-ins for the Ollama-backed embedder and LLM so the pipeline and API
//! can be exercised without a model server.

use async_trait::async_trait;
use docqa::llm::LLMClient;
use docqa::rag::embeddings::Embedder;
use docqa::types::{AppError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Deterministic embedder: a hashed bag of words per text.
///
/// Texts sharing vocabulary end up close in cosine space, which is enough to
/// make retrieval order predictable in tests.
#[derive(Clone, Default)]
pub struct MockEmbedder {
    should_fail: bool,
}

const DIMENSIONS: usize = 256;

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An embedder whose every call fails.
    pub fn failing() -> Self {
        Self { should_fail: true }
    }

    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.001; DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            // FNV-1a
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| {
                    (h ^ b as u64).wrapping_mul(0x100000001b3)
                });
            v[(hash % DIMENSIONS as u64) as usize] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.should_fail {
            return Err(AppError::Embedding("Mock embedding failure".to_string()));
        }
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

/// Mock LLM client with a canned response that records every prompt.
#[derive(Clone)]
pub struct MockLLMClient {
    response: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a new mock client that returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Arc::default(),
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            response: String::new(),
            should_fail: true,
            prompts: Arc::default(),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}
