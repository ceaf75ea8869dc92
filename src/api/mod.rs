//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for DocQA, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Documents (`/api/documents`)
//! - `GET /api/documents` - List uploaded files
//! - `POST /api/documents` - Upload files (`multipart/form-data`)
//! - `DELETE /api/documents` - Remove all uploaded files
//!
//! ## Index (`/api/index`)
//! - `POST /api/index` - Process documents and (re)build the index
//! - `GET /api/index` - Index status and manifest
//! - `DELETE /api/index` - Clear the vector DB
//!
//! ## Questions (`/api/ask`)
//! - `POST /api/ask` - Answer a question from the indexed documents
//!
//! ## Other
//! - `GET /health` - Health check endpoint
//! - `GET /api/openapi.json` - OpenAPI document
//! - `GET /` - Web UI (feature `ui`)
//!
//! Errors are returned as `{"error": "<message>"}` with a matching status code.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
