//! ChromaDB vector database integration.
//!
//! Talks to a Chroma server over its v2 REST API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | heartbeat | `GET /api/v2/heartbeat` |
//! | create | `POST …/collections` with `get_or_create` |
//! | lookup | `GET …/collections/{name}` |
//! | delete | `DELETE …/collections/{name}` |
//! | upsert | `POST …/collections/{id}/upsert` |
//! | query | `POST …/collections/{id}/query` |
//! | count | `GET …/collections/{id}/count` |
//!
//! where `…` is `/api/v2/tenants/{tenant}/databases/{database}`.
//!
//! Collections are created in cosine space, so a result's score is
//! `1 - distance`.

use crate::db::vectorstore::{ensure_embeddings, VectorStore};
use crate::types::{AppError, Document, DocumentMetadata, Result, SearchResult};
use crate::utils::toml_config::ChromaConfig;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CollectionModel {
    id: String,
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    documents: Vec<&'a str>,
    metadatas: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_embeddings: [&'a [f32]; 1],
    n_results: usize,
    include: [&'static str; 3],
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Map<String, Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

/// Chroma server client.
pub struct ChromaStore {
    client: Client,
    base_url: String,
    tenant: String,
    database: String,
    batch_size: usize,
}

impl ChromaStore {
    /// Create a client for the Chroma server at `url` using the default
    /// tenant and database.
    pub fn new(url: &str) -> Result<Self> {
        Self::from_config(&ChromaConfig {
            url: url.to_string(),
            ..ChromaConfig::default()
        })
    }

    pub fn from_config(config: &ChromaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            tenant: config.tenant.clone(),
            database: config.database.clone(),
            batch_size: config.upsert_batch_size.max(1),
        })
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    /// Check the server is reachable.
    pub async fn heartbeat(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/v2/heartbeat", self.base_url))
            .send()
            .await
            .map_err(request_error)?;
        check_status(response, "heartbeat").await?;
        Ok(())
    }

    /// Resolve a collection name to its id, `None` if it does not exist.
    async fn collection_id(&self, name: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}/{}", self.collections_url(), name))
            .send()
            .await
            .map_err(request_error)?;

        // Older servers answer a missing collection with a 400/500 and an
        // error body instead of 404.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("does not exist") || body.contains("NotFound") {
                return Ok(None);
            }
            return Err(AppError::VectorStore(format!(
                "Chroma lookup of '{}' failed: {}",
                name, body
            )));
        }

        let model: CollectionModel = response.json().await.map_err(request_error)?;
        Ok(Some(model.id))
    }

    async fn require_collection_id(&self, name: &str) -> Result<String> {
        self.collection_id(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Collection '{}' not found", name)))
    }
}

fn request_error(e: reqwest::Error) -> AppError {
    AppError::VectorStore(format!("Chroma request failed: {}", e))
}

async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(format!("Chroma {}: {}", operation, body)));
    }
    Err(AppError::VectorStore(format!(
        "Chroma {} returned {}: {}",
        operation, status, body
    )))
}

fn metadata_to_json(metadata: &DocumentMetadata) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("source".into(), json!(metadata.source));
    map.insert("chunk_index".into(), json!(metadata.chunk_index));
    // Chroma metadata values cannot be null.
    if let Some(page) = metadata.page {
        map.insert("page".into(), json!(page));
    }
    map
}

fn metadata_from_json(map: Option<&Map<String, Value>>) -> DocumentMetadata {
    let Some(map) = map else {
        return DocumentMetadata::default();
    };
    DocumentMetadata {
        source: map
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        page: map.get("page").and_then(Value::as_u64).map(|p| p as u32),
        chunk_index: map
            .get("chunk_index")
            .and_then(Value::as_u64)
            .unwrap_or_default() as usize,
    }
}

fn results_from_query(response: QueryResponse) -> Vec<SearchResult> {
    let ids = response.ids.into_iter().next().unwrap_or_default();
    let documents = response
        .documents
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();
    let metadatas = response
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default();
    let distances = response
        .distances
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();

    ids.into_iter()
        .enumerate()
        .map(|(i, id)| {
            let content = documents.get(i).cloned().flatten().unwrap_or_default();
            let metadata = metadata_from_json(metadatas.get(i).and_then(|m| m.as_ref()));
            let distance = distances.get(i).copied().flatten().unwrap_or(1.0);
            SearchResult {
                document: Document {
                    id,
                    content,
                    metadata,
                    embedding: None,
                },
                score: 1.0 - distance,
            }
        })
        .collect()
}

#[async_trait]
impl VectorStore for ChromaStore {
    fn provider_name(&self) -> &'static str {
        "chromadb"
    }

    async fn create_collection(&self, name: &str) -> Result<()> {
        let body = json!({
            "name": name,
            "get_or_create": true,
            "metadata": { "hnsw:space": "cosine" },
        });

        let response = self
            .client
            .post(self.collections_url())
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response, "create collection").await?;

        tracing::debug!(collection = %name, "Chroma collection ready");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        if self.collection_id(name).await?.is_none() {
            return Err(AppError::NotFound(format!("Collection '{}' not found", name)));
        }

        let response = self
            .client
            .delete(format!("{}/{}", self.collections_url(), name))
            .send()
            .await
            .map_err(request_error)?;
        check_status(response, "delete collection").await?;

        tracing::info!(collection = %name, "Chroma collection deleted");
        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        Ok(self.collection_id(name).await?.is_some())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let id = self.require_collection_id(collection).await?;
        let response = self
            .client
            .get(format!("{}/{}/count", self.collections_url(), id))
            .send()
            .await
            .map_err(request_error)?;
        let response = check_status(response, "count").await?;
        response.json::<usize>().await.map_err(request_error)
    }

    async fn upsert(&self, collection: &str, documents: &[Document]) -> Result<usize> {
        ensure_embeddings(documents)?;
        let id = self.require_collection_id(collection).await?;
        let url = format!("{}/{}/upsert", self.collections_url(), id);

        for batch in documents.chunks(self.batch_size) {
            let request = UpsertRequest {
                ids: batch.iter().map(|d| d.id.as_str()).collect(),
                embeddings: batch
                    .iter()
                    .filter_map(|d| d.embedding.as_deref())
                    .collect(),
                documents: batch.iter().map(|d| d.content.as_str()).collect(),
                metadatas: batch.iter().map(|d| metadata_to_json(&d.metadata)).collect(),
            };

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(request_error)?;
            check_status(response, "upsert").await?;
        }

        tracing::debug!(collection = %collection, count = documents.len(), "Upserted into Chroma");
        Ok(documents.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let id = self.require_collection_id(collection).await?;
        let request = QueryRequest {
            query_embeddings: [embedding],
            n_results: limit,
            include: ["documents", "metadatas", "distances"],
        };

        let response = self
            .client
            .post(format!("{}/{}/query", self.collections_url(), id))
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;
        let response = check_status(response, "query").await?;
        let parsed: QueryResponse = response.json().await.map_err(request_error)?;

        Ok(results_from_query(parsed))
    }
}
