//! Uploaded document management.

use crate::{
    types::{AppError, ClearResponse, Result, StoredDocument, UploadForm, UploadResponse},
    AppState,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};

/// List the files currently in the data directory.
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Uploaded documents", body = Vec<StoredDocument>)
    ),
    tag = "documents"
)]
pub async fn list_documents(State(state): State<AppState>) -> Result<Json<Vec<StoredDocument>>> {
    Ok(Json(state.workspace.list_documents().await?))
}

/// Upload one or more documents as `multipart/form-data`.
///
/// Every part that carries a file name is stored. Names are checked before
/// anything is written, so a rejected file leaves the data directory as it was.
#[utoipa::path(
    post,
    path = "/api/documents",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files saved", body = UploadResponse),
        (status = 400, description = "No files, or a file type that is not accepted"),
        (status = 413, description = "Upload too large")
    ),
    tag = "documents"
)]
pub async fn upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let name = state.workspace.sanitize_file_name(&file_name)?;
        let bytes = field
            .bytes()
            .await
            .map_err(upload_error)?;
        files.push((name, bytes));
    }

    if files.is_empty() {
        return Err(AppError::InvalidInput("No files were uploaded".into()));
    }

    let mut saved = Vec::with_capacity(files.len());
    for (name, bytes) in files {
        state.workspace.save_upload(&name, &bytes).await?;
        saved.push(name);
    }

    tracing::info!(files = saved.len(), "Saved uploaded documents");

    Ok(Json(UploadResponse {
        message: "Files saved. Now press 'Process documents' to create embeddings.".into(),
        saved,
    }))
}

/// A body cut off by the size limit is a 413; anything else is a bad request.
fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidInput(format!("Malformed upload: {}", e.body_text()))
    }
}

/// Delete every uploaded file.
#[utoipa::path(
    delete,
    path = "/api/documents",
    responses(
        (status = 200, description = "Data directory emptied", body = ClearResponse)
    ),
    tag = "documents"
)]
pub async fn clear_documents(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.workspace.clear_uploads().await?;

    tracing::info!(removed, "Data cleared");

    Ok(Json(ClearResponse {
        removed,
        message: "data/ cleaned.".into(),
    }))
}
