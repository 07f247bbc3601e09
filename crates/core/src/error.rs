use crate::types::DbId;

/// Domain error shared by the engine and the query layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Caller-supplied input is out of range or malformed.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Infrastructure failure with the underlying detail flattened to text.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a not-found error keyed by a numeric id.
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
