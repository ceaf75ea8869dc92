//! Vector index build, status and teardown.

use crate::{
    types::{ClearResponse, IndexReport, IndexStatus, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Process all uploaded documents into a fresh index.
#[utoipa::path(
    post,
    path = "/api/index",
    responses(
        (status = 200, description = "Index built", body = IndexReport),
        (status = 409, description = "No documents to index"),
        (status = 502, description = "Embedding service or vector store failed")
    ),
    tag = "index"
)]
pub async fn build_index(State(state): State<AppState>) -> Result<Json<IndexReport>> {
    let report = state.indexer.rebuild().await?;
    Ok(Json(report))
}

/// Whether an index has been built, with its manifest when available.
#[utoipa::path(
    get,
    path = "/api/index",
    responses(
        (status = 200, description = "Index status", body = IndexStatus)
    ),
    tag = "index"
)]
pub async fn index_status(State(state): State<AppState>) -> Result<Json<IndexStatus>> {
    Ok(Json(IndexStatus {
        present: state.workspace.index_present().await,
        manifest: state.workspace.read_manifest().await,
    }))
}

/// Drop the vector collection and empty the index directory.
#[utoipa::path(
    delete,
    path = "/api/index",
    responses(
        (status = 200, description = "Index cleared", body = ClearResponse)
    ),
    tag = "index"
)]
pub async fn clear_index(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state
        .workspace
        .read_manifest()
        .await
        .map(|m| m.chunk_count)
        .unwrap_or(0);

    state.indexer.clear().await?;

    Ok(Json(ClearResponse {
        removed,
        message: "db/ cleared.".into(),
    }))
}
