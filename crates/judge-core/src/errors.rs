//! Cross-cutting error types for the ranking engine.
//!
//! Storage errors (`DatabaseError`) live in `judge-db` and wrap `CoreError`.

use thiserror::Error;

/// Errors raised by pure computation in `judge-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A belief parameter was outside its valid domain (non-positive or
    /// non-finite variance or shape parameter).
    #[error("Invalid belief input: {field} = {value}")]
    InvalidBelief { field: &'static str, value: f64 },

    /// Data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}
