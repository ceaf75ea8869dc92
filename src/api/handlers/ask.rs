//! Question answering endpoint.

use crate::{
    types::{AskRequest, AskResponse, Result},
    AppState,
};
use axum::{extract::State, Json};

/// Answer a question from the indexed documents.
#[utoipa::path(
    post,
    path = "/api/ask",
    request_body = AskRequest,
    responses(
        (status = 200, description = "Answer with the chunks it was based on", body = AskResponse),
        (status = 400, description = "Empty question"),
        (status = 409, description = "No index has been built"),
        (status = 502, description = "LLM or embedding service failed")
    ),
    tag = "ask"
)]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    tracing::info!(question_len = payload.question.len(), "Question received");

    let response = state.qa.ask(&payload.question, payload.top_k).await?;
    Ok(Json(response))
}
