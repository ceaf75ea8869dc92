//! Retrieval Augmented Generation (RAG) Pipeline
//!
//! # Module Structure
//!
//! - [`rag::loader`](crate::rag::loader) - Page-level text extraction from PDFs and text files
//! - [`rag::chunker`](crate::rag::chunker) - Overlapping character-window chunking
//! - [`rag::embeddings`](crate::rag::embeddings) - Embedding models served by Ollama
//! - [`rag::indexer`](crate::rag::indexer) - Builds and clears the vector index
//! - [`rag::qa`](crate::rag::qa) - Retrieval and answer generation
//!
//! # RAG Pipeline
//!
//! 1. **Ingestion** - Uploaded files are loaded page by page and chunked
//! 2. **Storage** - Chunk embeddings are stored in the vector database
//! 3. **Retrieval** - The question is embedded and the top chunks retrieved
//! 4. **Generation** - The chunks are joined into a prompt for the LLM
//!
//! # Example
//!
//! ```ignore
//! use docqa::rag::{chunker::TextChunker, indexer::Indexer, qa::QaService};
//!
//! let report = indexer.rebuild().await?;
//! println!("Indexed {} chunks", report.chunks);
//!
//! let response = qa.ask("What is this document about?", None).await?;
//! println!("{}", response.answer);
//! ```

#![allow(missing_docs)]

pub mod chunker;
pub mod embeddings;
pub mod indexer;
pub mod loader;
pub mod qa;
