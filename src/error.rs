//! Error types for import and validation

use thiserror::Error;

/// Errors from bringing a grammar document into the model.
///
/// Import is all-or-nothing for a single document: a payload that fails to
/// deserialize produces exactly one of these and no half-normalized state.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read grammar document: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed grammar document: {0}")]
    Malformed(#[from] serde_json::Error),
}
