use crate::api::handlers::{ask, documents, index};
use crate::types::{
    AskRequest, AskResponse, ClearResponse, IndexManifest, IndexReport, IndexStatus, LoadFailure,
    Source, StoredDocument, UploadForm, UploadResponse,
};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI description of the JSON API.
#[derive(OpenApi)]
#[openapi(
    info(title = "DocQA", description = "Document question answering over uploaded files"),
    paths(
        documents::list_documents,
        documents::upload_documents,
        documents::clear_documents,
        index::build_index,
        index::index_status,
        index::clear_index,
        ask::ask,
    ),
    components(schemas(
        AskRequest,
        AskResponse,
        Source,
        StoredDocument,
        UploadForm,
        UploadResponse,
        ClearResponse,
        IndexStatus,
        IndexManifest,
        IndexReport,
        LoadFailure,
    )),
    tags(
        (name = "documents", description = "Uploaded files"),
        (name = "index", description = "Vector index"),
        (name = "ask", description = "Question answering"),
    )
)]
pub struct ApiDoc;

/// Build the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let max_body = state.config.server.max_upload_mb * 1024 * 1024;

    let api = Router::new()
        .route(
            "/documents",
            get(documents::list_documents)
                .post(documents::upload_documents)
                .delete(documents::clear_documents),
        )
        .route(
            "/index",
            post(index::build_index)
                .get(index::index_status)
                .delete(index::clear_index),
        )
        .route("/ask", post(ask::ask))
        .route("/openapi.json", get(openapi));

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api);

    #[cfg(feature = "ui")]
    let router = router
        .route("/", get(crate::api::handlers::ui::index))
        .route("/assets/{*path}", get(crate::api::handlers::ui::asset));

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(DefaultBodyLimit::disable()),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
