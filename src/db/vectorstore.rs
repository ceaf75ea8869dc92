//! Vector Store Abstraction Layer
//!
//! The application never computes similarity itself in production: chunks and
//! their embeddings are handed to an external vector database. This module
//! defines the operations the indexing and question-answering flows need, so
//! the Chroma client and the in-memory store used by tests are
//! interchangeable.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    VectorStore Trait                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ create_collection │ upsert │ search │ delete_collection │
//! └─────────────────────────────────────────────────────────┘
//!            ▲                                 ▲
//!      ┌─────┴──────┐                   ┌──────┴──────┐
//!      │ ChromaStore│                   │  InMemory   │
//!      │  (server)  │                   │  (testing)  │
//!      └────────────┘                   └─────────────┘
//! ```

use crate::types::{AppError, Document, Result, SearchResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Vector Store Trait
// ============================================================================

/// Abstract trait for vector database operations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get the name of this vector store provider.
    fn provider_name(&self) -> &'static str;

    /// Create a collection, or do nothing if it already exists.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Delete a collection and all its data.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the collection doesn't exist.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Check if a collection exists.
    async fn collection_exists(&self, name: &str) -> Result<bool>;

    /// Count records in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Upsert documents with their embeddings into a collection.
    ///
    /// Every document must carry an embedding. Returns the number stored.
    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize>;

    /// Nearest neighbours of `embedding`, best match first.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Drop the collection if present and create it empty.
    async fn recreate_collection(&self, name: &str) -> Result<()> {
        if self.collection_exists(name).await? {
            self.delete_collection(name).await?;
        }
        self.create_collection(name).await
    }
}

pub(crate) fn ensure_embeddings(documents: &[Document]) -> Result<()> {
    match documents.iter().find(|d| d.embedding.is_none()) {
        Some(doc) => Err(AppError::InvalidInput(format!(
            "Document '{}' is missing embedding",
            doc.id
        ))),
        None => Ok(()),
    }
}

// ============================================================================
// In-Memory Vector Store (for testing)
// ============================================================================

/// In-memory vector store.
///
/// Data is not persisted and will be lost when the process exits.
/// Uses cosine similarity for vector comparisons.
#[derive(Clone, Default)]
pub struct InMemoryVectorStore {
    collections: Arc<RwLock<HashMap<String, HashMap<String, Document>>>>,
}

impl InMemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate cosine similarity between two vectors.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }
}

fn not_found(name: &str) -> AppError {
    AppError::NotFound(format!("Collection '{}' not found", name))
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        self.collections
            .write()
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| not_found(name))
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collections.read().contains_key(name))
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.collections
            .read()
            .get(collection)
            .map(|c| c.len())
            .ok_or_else(|| not_found(collection))
    }

    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize> {
        ensure_embeddings(documents)?;

        let mut collections = self.collections.write();
        let col = collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection))?;

        for doc in documents {
            col.insert(doc.id.clone(), doc.clone());
        }

        Ok(documents.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read();
        let col = collections
            .get(collection)
            .ok_or_else(|| not_found(collection))?;

        let mut results: Vec<SearchResult> = col
            .values()
            .filter_map(|doc| {
                let score = Self::cosine_similarity(embedding, doc.embedding.as_ref()?);
                Some(SearchResult {
                    document: Document {
                        embedding: None,
                        ..doc.clone()
                    },
                    score,
                })
            })
            .collect();

        // Sort by score descending, ties by id for stable output
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.id.cmp(&b.document.id))
        });
        results.truncate(limit);

        Ok(results)
    }
}

// ============================================================================
// Tests
// ============================================================================
