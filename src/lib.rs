//! # DocQA - Document Question Answering Server
//!
//! Upload PDFs, build embeddings with an Ollama model, store them in Chroma,
//! and ask questions that are answered from the most relevant passages.
//!
//! ## Overview
//!
//! DocQA can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `docqa` binary and open the web UI
//! 2. **As a library** - Build an [`AppState`] and drive the pipeline directly
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use docqa::{AppState, DocqaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DocqaConfig::load("docqa.toml")?;
//!     let state = AppState::from_config(config, false)?;
//!
//!     state.workspace.save_upload("report.pdf", &std::fs::read("report.pdf")?).await?;
//!     let report = state.indexer.rebuild().await?;
//!     println!("Indexed {} chunks", report.chunks);
//!
//!     let response = state.qa.ask("What are the key findings?", None).await?;
//!     println!("{}", response.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `ui` | Embedded single-page web UI served at `/` (default) |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line parsing and terminal output
//! - [`db`] - Vector stores (Chroma, in-memory)
//! - [`llm`] - LLM client implementations
//! - [`rag`] - Loading, chunking, embedding, indexing and question answering
//! - [`storage`] - Upload and index directories
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Vector database clients.
pub mod db;
/// LLM provider clients and abstractions.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Upload and index directory management.
#[allow(missing_docs)]
pub mod storage;
/// Core types (requests, responses, errors).
#[allow(missing_docs)]
pub mod types;
/// Configuration utilities (TOML).
#[allow(missing_docs)]
pub mod utils;

// Re-export commonly used types
pub use db::{ChromaStore, InMemoryVectorStore, VectorStore};
pub use llm::{LLMClient, OllamaClient};
pub use rag::embeddings::{Embedder, OllamaEmbedder};
pub use rag::indexer::Indexer;
pub use rag::qa::QaService;
pub use storage::Workspace;
pub use types::{AppError, Result};
pub use utils::toml_config::DocqaConfig;

use crate::rag::chunker::TextChunker;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<DocqaConfig>,
    /// Upload and index directories
    pub workspace: Workspace,
    /// Builds and clears the vector index
    pub indexer: Arc<Indexer>,
    /// Answers questions from the index
    pub qa: Arc<QaService>,
}

impl AppState {
    /// Assemble the state from already-constructed services.
    pub fn new(
        config: DocqaConfig,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LLMClient>,
    ) -> Result<Self> {
        let workspace = Workspace::from_config(&config.storage);
        let chunker = TextChunker::new(config.rag.chunk_size, config.rag.chunk_overlap)?;
        let collection = config.chroma.collection.clone();

        let indexer = Indexer::new(
            workspace.clone(),
            embedder.clone(),
            store.clone(),
            chunker,
            collection.clone(),
        );
        let qa = QaService::new(
            workspace.clone(),
            embedder,
            store,
            llm,
            collection,
            config.rag.top_k,
        );

        Ok(Self {
            config: Arc::new(config),
            workspace,
            indexer: Arc::new(indexer),
            qa: Arc::new(qa),
        })
    }

    /// Connect to Ollama and, unless `in_memory` is set, to Chroma.
    pub fn from_config(config: DocqaConfig, in_memory: bool) -> Result<Self> {
        let embedder = OllamaEmbedder::new(&config.ollama.base_url, &config.ollama.embedding_model)
            .with_batch_size(config.ollama.embed_batch_size);
        let llm = OllamaClient::new(&config.ollama.base_url, &config.ollama.model)
            .with_temperature(config.ollama.temperature);
        let store: Arc<dyn VectorStore> = if in_memory {
            Arc::new(InMemoryVectorStore::new())
        } else {
            Arc::new(ChromaStore::from_config(&config.chroma)?)
        };

        Self::new(config, Arc::new(embedder), store, Arc::new(llm))
    }
}
