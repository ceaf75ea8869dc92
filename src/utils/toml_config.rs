//! TOML-based configuration for DocQA
//!
//! All settings live in a single `docqa.toml`. Every field has a default, so a
//! missing file (or an empty one) yields a working local setup that talks to
//! Ollama on `localhost:11434` and Chroma on `localhost:8000`.
//!
//! Environment variables (optionally from `.env`) override file values:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `DOCQA_HOST` / `DOCQA_PORT` | `server.host` / `server.port` |
//! | `DOCQA_DATA_DIR` / `DOCQA_DB_DIR` | `storage.data_dir` / `storage.db_dir` |
//! | `DOCQA_OLLAMA_URL` | `ollama.base_url` |
//! | `DOCQA_MODEL` | `ollama.model` |
//! | `DOCQA_EMBEDDING_MODEL` | `ollama.embedding_model` |
//! | `DOCQA_CHROMA_URL` | `chroma.url` |

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure loaded from docqa.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocqaConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub chroma: ChromaConfig,

    #[serde(default)]
    pub rag: RagConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Request body limit for uploads, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_max_upload_mb() -> usize {
    50
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

// ============= Storage Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Folder receiving uploaded documents
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Folder holding the index manifest
    #[serde(default = "default_db_dir")]
    pub db_dir: PathBuf,

    /// Lowercase file extensions accepted for upload and indexing
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_db_dir() -> PathBuf {
    PathBuf::from("db")
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            db_dir: default_db_dir(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

// ============= Ollama Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Model used to answer questions
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used to embed chunks and queries
    #[serde(default = "default_model")]
    pub embedding_model: String,

    #[serde(default)]
    pub temperature: f32,

    /// Number of texts sent per embedding request
    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma:2b".to_string()
}

fn default_embed_batch_size() -> usize {
    32
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_model(),
            embedding_model: default_model(),
            temperature: 0.0,
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

// ============= Chroma Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChromaConfig {
    #[serde(default = "default_chroma_url")]
    pub url: String,

    #[serde(default = "default_tenant")]
    pub tenant: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Maximum records per upsert request
    #[serde(default = "default_upsert_batch_size")]
    pub upsert_batch_size: usize,
}

fn default_chroma_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tenant() -> String {
    "default_tenant".to_string()
}

fn default_database() -> String {
    "default_database".to_string()
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_upsert_batch_size() -> usize {
    100
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            url: default_chroma_url(),
            tenant: default_tenant(),
            database: default_database(),
            collection: default_collection(),
            upsert_batch_size: default_upsert_batch_size(),
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    150
}

fn default_top_k() -> usize {
    4
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{name}' has an invalid value: {value}")]
    InvalidEnvVar { name: String, value: String },
}

impl DocqaConfig {
    /// Load configuration from a TOML file and apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::dotenv().ok();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str::<DocqaConfig>(&content)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            DocqaConfig::default()
        };

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Apply `DOCQA_*` overrides using the given variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DOCQA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("DOCQA_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: "DOCQA_PORT".to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(dir) = lookup("DOCQA_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("DOCQA_DB_DIR") {
            self.storage.db_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("DOCQA_OLLAMA_URL") {
            self.ollama.base_url = url;
        }
        if let Some(model) = lookup("DOCQA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(model) = lookup("DOCQA_EMBEDDING_MODEL") {
            self.ollama.embedding_model = model;
        }
        if let Some(url) = lookup("DOCQA_CHROMA_URL") {
            self.chroma.url = url;
        }
        Ok(())
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rag.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.rag.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.top_k must be greater than zero".to_string(),
            ));
        }
        let urls = [
            ("ollama.base_url", &self.ollama.base_url),
            ("chroma.url", &self.chroma.url),
        ];
        for (field, url) in urls {
            let http = url.starts_with("http://") || url.starts_with("https://");
            if !http || url.contains(' ') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be an http(s) URL, got '{}'",
                    field, url
                )));
            }
        }
        if self.chroma.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chroma.collection must not be empty".to_string(),
            ));
        }
        if self.ollama.embed_batch_size == 0 || self.chroma.upsert_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "batch sizes must be greater than zero".to_string(),
            ));
        }
        if self.storage.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.allowed_extensions must list at least one extension".to_string(),
            ));
        }
        if !matches!(self.server.log_format.as_str(), "pretty" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "server.log_format must be 'pretty' or 'json', got '{}'",
                self.server.log_format
            )));
        }
        Ok(())
    }

    /// Socket address string the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Template written by `docqa init`.
pub const CONFIG_TEMPLATE: &str = r#"# DocQA configuration

[server]
host = "127.0.0.1"
port = 8501
log_level = "info"
# "pretty" or "json"
log_format = "pretty"
max_upload_mb = 50

[storage]
data_dir = "data"
db_dir = "db"
allowed_extensions = ["pdf"]

[ollama]
base_url = "http://localhost:11434"
model = "gemma:2b"
embedding_model = "gemma:2b"
temperature = 0.0
embed_batch_size = 32

[chroma]
url = "http://localhost:8000"
tenant = "default_tenant"
database = "default_database"
collection = "documents"
upsert_batch_size = 100

[rag]
chunk_size = 1000
chunk_overlap = 150
top_k = 4
"#;
