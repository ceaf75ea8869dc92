//! Index building and teardown.
//!
//! A rebuild loads every accepted file in `data/`, splits the pages into
//! overlapping chunks, embeds them and replaces the contents of the vector
//! store collection. A manifest in `db/` records the result.

use crate::db::VectorStore;
use crate::rag::chunker::TextChunker;
use crate::rag::embeddings::Embedder;
use crate::rag::loader::load_document;
use crate::storage::{file_name_of, Workspace};
use crate::types::{AppError, IndexManifest, IndexReport, LoadFailure, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// Files extracted in parallel; results keep file order.
const LOAD_CONCURRENCY: usize = 4;

pub struct Indexer {
    workspace: Workspace,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    chunker: TextChunker,
    collection: String,
    // Serializes rebuilds and clears
    lock: Mutex<()>,
}

impl Indexer {
    pub fn new(
        workspace: Workspace,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        chunker: TextChunker,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            workspace,
            embedder,
            store,
            chunker,
            collection: collection.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Process every uploaded document and (re)build the index.
    pub async fn rebuild(&self) -> Result<IndexReport> {
        let _guard = self.lock.lock().await;
        let start = Instant::now();

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        let mut loaded_files = 0;

        let paths = self.workspace.document_paths().await?;
        let loaded: Vec<_> = stream::iter(paths)
            .map(|path| async move {
                let result = load_document(&path).await;
                (path, result)
            })
            .buffered(LOAD_CONCURRENCY)
            .collect()
            .await;

        for (path, result) in loaded {
            match result {
                Ok(pages) => {
                    if !pages.is_empty() {
                        loaded_files += 1;
                    }
                    documents.extend(pages);
                }
                Err(e) => {
                    let file = file_name_of(&path);
                    tracing::warn!(file = %file, error = %e, "Failed to load document");
                    failures.push(LoadFailure {
                        file,
                        error: e.to_string(),
                    });
                }
            }
        }

        if documents.is_empty() {
            return Err(AppError::NoDocuments);
        }

        tracing::info!(
            files = loaded_files,
            pages = documents.len(),
            "Splitting documents into chunks"
        );
        let mut chunks = self.chunker.split_documents(&documents);
        if chunks.is_empty() {
            return Err(AppError::NoDocuments);
        }

        tracing::info!(
            chunks = chunks.len(),
            model = %self.embedder.model_name(),
            "Creating embeddings"
        );
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = Some(embedding);
        }

        tracing::info!(
            provider = self.store.provider_name(),
            collection = %self.collection,
            "Building vector store"
        );
        // The old manifest must not outlive a collection that is being replaced
        self.workspace.clear_index_dir().await?;
        self.store.recreate_collection(&self.collection).await?;
        let stored = self.store.upsert(&self.collection, &chunks).await?;

        let sources: BTreeSet<String> =
            chunks.iter().map(|c| c.metadata.source.clone()).collect();
        self.workspace
            .write_manifest(&IndexManifest {
                collection: self.collection.clone(),
                chunk_count: stored,
                sources: sources.into_iter().collect(),
                embedding_model: self.embedder.model_name().to_string(),
                built_at: Utc::now(),
            })
            .await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            documents = loaded_files,
            chunks = stored,
            failures = failures.len(),
            duration_ms,
            "Index built and persisted"
        );

        Ok(IndexReport {
            documents: loaded_files,
            chunks: stored,
            failures,
            collection: self.collection.clone(),
            duration_ms,
        })
    }

    /// Drop the vector store collection and empty `db/`.
    ///
    /// An absent collection or an unreachable store is not an error; only
    /// failing to empty `db/` is.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Err(e) = self.store.delete_collection(&self.collection).await {
            tracing::info!(error = %e, "Vector store was not active or already cleared");
        }

        self.workspace.clear_index_dir().await?;
        tracing::info!(collection = %self.collection, "Vector DB cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryVectorStore;
    use crate::types::{Document, SearchResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    /// Embeds text by letter frequency so similar texts land close together.
    struct LetterEmbedder;

    #[async_trait]
    impl Embedder for LetterEmbedder {
        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; 26];
                    for c in t.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                        v[(c - b'a') as usize] += 1.0;
                    }
                    v
                })
                .collect())
        }

        fn model_name(&self) -> &str {
            "letters"
        }
    }

    fn setup(dir: &TempDir) -> (Indexer, Arc<InMemoryVectorStore>, Workspace) {
        let workspace = Workspace::new(dir.path().join("data"), dir.path().join("db"))
            .with_allowed_extensions(vec!["txt".into(), "pdf".into()]);
        let store = Arc::new(InMemoryVectorStore::new());
        let indexer = Indexer::new(
            workspace.clone(),
            Arc::new(LetterEmbedder),
            store.clone(),
            TextChunker::new(200, 30).unwrap(),
            "documents",
        );
        (indexer, store, workspace)
    }

    #[tokio::test]
    async fn test_rebuild_without_documents() {
        let dir = TempDir::new().unwrap();
        let (indexer, _, workspace) = setup(&dir);
        workspace.ensure_dirs().await.unwrap();

        assert!(matches!(indexer.rebuild().await, Err(AppError::NoDocuments)));
        assert!(!workspace.index_present().await);
    }

    #[tokio::test]
    async fn test_rebuild_indexes_chunks_and_writes_manifest() {
        let dir = TempDir::new().unwrap();
        let (indexer, store, workspace) = setup(&dir);
        workspace
            .save_upload("rust.txt", "Ownership and borrowing. ".repeat(30).as_bytes())
            .await
            .unwrap();
        workspace
            .save_upload("tea.txt", b"Green tea is steeped at low temperature.")
            .await
            .unwrap();

        let report = indexer.rebuild().await.unwrap();

        assert_eq!(report.documents, 2);
        assert!(report.chunks > 2);
        assert!(report.failures.is_empty());
        assert_eq!(store.count("documents").await.unwrap(), report.chunks);

        let manifest = workspace.read_manifest().await.unwrap();
        assert_eq!(manifest.chunk_count, report.chunks);
        assert_eq!(manifest.sources, vec!["rust.txt", "tea.txt"]);
        assert_eq!(manifest.embedding_model, "letters");
    }

    #[tokio::test]
    async fn test_rebuild_replaces_previous_index() {
        let dir = TempDir::new().unwrap();
        let (indexer, store, workspace) = setup(&dir);
        workspace.save_upload("a.txt", b"alpha").await.unwrap();
        workspace.save_upload("b.txt", b"beta").await.unwrap();
        indexer.rebuild().await.unwrap();
        assert_eq!(store.count("documents").await.unwrap(), 2);

        std::fs::remove_file(workspace.data_dir().join("b.txt")).unwrap();
        let report = indexer.rebuild().await.unwrap();

        assert_eq!(report.chunks, 1);
        assert_eq!(store.count("documents").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bad_file_recorded_as_failure() {
        let dir = TempDir::new().unwrap();
        let (indexer, _, workspace) = setup(&dir);
        workspace.save_upload("broken.pdf", b"garbage").await.unwrap();
        workspace.save_upload("good.txt", b"some real text").await.unwrap();

        let report = indexer.rebuild().await.unwrap();

        assert_eq!(report.documents, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, "broken.pdf");
    }

    /// Delegates to an in-memory store; upserts fail once `fail_upserts` is set.
    struct FlakyStore {
        inner: InMemoryVectorStore,
        fail_upserts: AtomicBool,
    }

    #[async_trait]
    impl VectorStore for FlakyStore {
        fn provider_name(&self) -> &'static str {
            "flaky"
        }

        async fn create_collection(&self, name: &str) -> Result<()> {
            self.inner.create_collection(name).await
        }

        async fn delete_collection(&self, name: &str) -> Result<()> {
            self.inner.delete_collection(name).await
        }

        async fn collection_exists(&self, name: &str) -> Result<bool> {
            self.inner.collection_exists(name).await
        }

        async fn count(&self, collection: &str) -> Result<usize> {
            self.inner.count(collection).await
        }

        async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize> {
            if self.fail_upserts.load(Ordering::SeqCst) {
                return Err(AppError::VectorStore("connection reset".into()));
            }
            self.inner.upsert(collection, documents).await
        }

        async fn search(
            &self,
            collection: &str,
            embedding: &[f32],
            limit: usize,
        ) -> Result<Vec<SearchResult>> {
            self.inner.search(collection, embedding, limit).await
        }
    }

    #[tokio::test]
    async fn test_failed_upsert_drops_previous_manifest() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::new(dir.path().join("data"), dir.path().join("db"))
            .with_allowed_extensions(vec!["txt".into()]);
        let store = Arc::new(FlakyStore {
            inner: InMemoryVectorStore::new(),
            fail_upserts: AtomicBool::new(false),
        });
        let indexer = Indexer::new(
            workspace.clone(),
            Arc::new(LetterEmbedder),
            store.clone(),
            TextChunker::new(200, 30).unwrap(),
            "documents",
        );
        workspace.save_upload("a.txt", b"alpha").await.unwrap();
        indexer.rebuild().await.unwrap();
        assert!(workspace.index_present().await);

        store.fail_upserts.store(true, Ordering::SeqCst);
        let result = indexer.rebuild().await;

        assert!(matches!(result, Err(AppError::VectorStore(_))));
        assert!(workspace.read_manifest().await.is_none());
        assert!(!workspace.index_present().await);
    }

    #[tokio::test]
    async fn test_clear_tolerates_missing_collection() {
        let dir = TempDir::new().unwrap();
        let (indexer, store, workspace) = setup(&dir);
        workspace.save_upload("a.txt", b"alpha").await.unwrap();
        indexer.rebuild().await.unwrap();

        indexer.clear().await.unwrap();
        assert!(!store.collection_exists("documents").await.unwrap());
        assert!(!workspace.index_present().await);

        // Second clear: collection already gone
        indexer.clear().await.unwrap();
    }
}
