use crate::llm::client::LLMClient;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use ollama_rs::{generation::completion::request::GenerationRequest, models::ModelOptions, Ollama};

const DEFAULT_PORT: u16 = 11434;

/// Split a base URL such as `http://host:port` into the `(scheme://host, port)`
/// pair the `ollama_rs::Ollama` builder expects.
pub(crate) fn split_base_url(base_url: &str) -> (String, u16) {
    let trimmed = base_url.trim().trim_end_matches('/');
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (scheme, rest),
        None => ("http", trimmed),
    };

    // Drop any path component.
    let authority = rest.split('/').next().unwrap_or(rest);

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host, port),
            Err(_) => (host, DEFAULT_PORT),
        },
        None => (authority, DEFAULT_PORT),
    };

    let host = if host.is_empty() { "localhost" } else { host };
    (format!("{}://{}", scheme, host), port)
}

pub(crate) fn connect(base_url: &str) -> Ollama {
    let (host, port) = split_base_url(base_url);
    Ollama::builder().host(host.as_str()).port(port).build()
}

/// Completions from an Ollama server's `/api/generate` endpoint.
pub struct OllamaClient {
    client: Ollama,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: connect(base_url),
            model: model.into(),
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl LLMClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerationRequest::new(self.model.clone(), prompt.to_string())
            .options(ModelOptions::default().temperature(self.temperature));

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| AppError::LLM(format!("Ollama error: {}", e)))?;

        Ok(response.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
