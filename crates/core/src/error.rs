use crate::types::DbId;

/// Domain-level error type shared by all crates.
///
/// The dispatch-specific variants carry the exact operator-facing messages:
/// state-guard violations are surfaced to the caller and never retried.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("This report already has an active dispatch")]
    ActiveDispatchExists,

    #[error("Dispatch already accepted by another officer")]
    AlreadyAccepted,

    #[error("Invalid dispatch state: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
