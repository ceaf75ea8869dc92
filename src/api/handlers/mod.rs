//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Question answering.
pub mod ask;
/// Upload, listing and clearing of documents.
pub mod documents;
/// Index build, status and teardown.
pub mod index;
/// Embedded web UI.
#[cfg(feature = "ui")]
pub mod ui;
