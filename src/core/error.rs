use thiserror::Error;

use crate::services::StoreError;

/// Outcomes of the relationship core that callers must tell apart
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not eligible: {0}")]
    NotEligible(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The pair was mutated concurrently; the caller may retry once
    #[error("Race lost: {0}")]
    RaceLost(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl MatchError {
    /// Stable machine-readable code for this outcome
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::NotFound(_) => "not_found",
            MatchError::Conflict(_) => "conflict",
            MatchError::Forbidden(_) => "forbidden",
            MatchError::NotEligible(_) => "not_eligible",
            MatchError::InvalidOperation(_) => "invalid_operation",
            MatchError::RaceLost(_) => "race_lost",
            MatchError::Storage(_) => "storage_error",
        }
    }
}

impl From<StoreError> for MatchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SerializationFailure(msg) => MatchError::RaceLost(msg),
            StoreError::UniqueViolation(msg) => MatchError::Conflict(msg),
            other => MatchError::Storage(other),
        }
    }
}
