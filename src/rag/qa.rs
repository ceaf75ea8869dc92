//! Question answering over the indexed documents.

use crate::db::VectorStore;
use crate::llm::LLMClient;
use crate::rag::embeddings::Embedder;
use crate::storage::Workspace;
use crate::types::{AppError, AskResponse, Result, SearchResult, Source};
use std::sync::Arc;
use std::time::Instant;

/// Characters of chunk text returned with each source.
const EXCERPT_CHARS: usize = 200;

/// Assemble the LLM prompt from retrieved chunk texts.
///
/// Chunks are joined with a blank line, in retrieval order.
pub fn build_prompt(question: &str, chunks: &[&str]) -> String {
    let context = chunks.join("\n\n");
    format!(
        "Use the following context to answer the question.\n\nContext:\n{}\n\nQuestion:\n{}\n",
        context, question
    )
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(EXCERPT_CHARS) {
        Some((end, _)) => format!("{}...", &trimmed[..end]),
        None => trimmed.to_string(),
    }
}

pub struct QaService {
    workspace: Workspace,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn LLMClient>,
    collection: String,
    top_k: usize,
}

impl QaService {
    pub fn new(
        workspace: Workspace,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn LLMClient>,
        collection: impl Into<String>,
        top_k: usize,
    ) -> Self {
        Self {
            workspace,
            embedder,
            store,
            llm,
            collection: collection.into(),
            top_k: top_k.max(1),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve the chunks most similar to `question`.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if !self.workspace.index_present().await {
            return Err(AppError::IndexMissing);
        }

        let embedding = self.embedder.embed_query(question).await?;
        match self.store.search(&self.collection, &embedding, top_k).await {
            Err(AppError::NotFound(_)) => Err(AppError::IndexMissing),
            other => other,
        }
    }

    /// Answer a question from the top matching chunks.
    pub async fn ask(&self, question: &str, top_k: Option<usize>) -> Result<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput("Question cannot be empty".into()));
        }
        let top_k = top_k.unwrap_or(self.top_k);
        if top_k == 0 {
            return Err(AppError::InvalidInput("top_k must be at least 1".into()));
        }

        let start = Instant::now();
        let results = self.retrieve(question, top_k).await?;
        tracing::debug!(retrieved = results.len(), top_k, "Retrieved context chunks");

        let texts: Vec<&str> = results.iter().map(|r| r.document.content.as_str()).collect();
        let prompt = build_prompt(question, &texts);
        let answer = self.llm.generate(&prompt).await?;

        let sources = results
            .iter()
            .map(|r| Source {
                source: r.document.metadata.source.clone(),
                page: r.document.metadata.page,
                chunk_index: r.document.metadata.chunk_index,
                score: r.score,
                excerpt: excerpt(&r.document.content),
            })
            .collect();

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            model = %self.llm.model_name(),
            chunks = texts.len(),
            duration_ms,
            "Answered question"
        );

        Ok(AskResponse {
            answer: answer.trim().to_string(),
            sources,
            model: self.llm.model_name().to_string(),
            duration_ms,
        })
    }
}
