//! LLM client abstraction and the Ollama implementation.
//!
//! - [`LLMClient`] - the trait the question-answering flow depends on
//! - [`OllamaClient`] - completions from a local or remote Ollama server

/// Core LLM client trait.
pub mod client;
/// Ollama-backed client and connection helpers.
pub mod ollama;

pub use client::LLMClient;
pub use ollama::OllamaClient;
