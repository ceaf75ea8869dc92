//! Vector stores.
//!
//! - `chromadb` - REST client for a Chroma server (used in production)
//! - `vectorstore` - the [`VectorStore`] trait and an in-memory implementation

#![allow(missing_docs)]

pub mod chromadb;
pub mod vectorstore;

pub use chromadb::ChromaStore;
pub use vectorstore::{InMemoryVectorStore, VectorStore};
