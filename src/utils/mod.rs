//! Configuration utilities.

/// `docqa.toml` loading, defaults and validation.
pub mod toml_config;
