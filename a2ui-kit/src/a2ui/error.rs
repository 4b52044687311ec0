//! A2UI Errors

use thiserror::Error;

/// Errors surfaced by the A2UI engine.
///
/// Protocol-level problems (unknown surfaces, unknown catalogs, malformed
/// entries inside a message batch) are logged and skipped by the processor
/// rather than returned; only contract violations and top-level parse
/// failures reach the caller.
#[derive(Debug, Error)]
pub enum A2uiError {
    #[error("Component '{id}' already exists")]
    DuplicateComponent { id: String },

    #[error("Surface not found: {0}")]
    UnknownSurface(String),

    #[error("Catalog not found: {0}")]
    UnknownCatalog(String),

    #[error("Invalid A2UI message: {0}")]
    InvalidMessage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, A2uiError>;
