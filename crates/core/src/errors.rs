use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Business-rule violations that no amount of retrying with the same input
/// will resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflict {
    ProposalInactive,
    CapacityExceeded,
    DuplicateClaim,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Conflict::ProposalInactive => "Proposal is not active",
            Conflict::CapacityExceeded => "All slots are filled",
            Conflict::DuplicateClaim => "You have already claimed a slot",
        };
        f.write_str(message)
    }
}

#[derive(Error, Debug)]
pub enum HuddleError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(Conflict),

    /// The store failed mid-operation. The transaction was rolled back, so
    /// the whole operation is safe to retry.
    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal server error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HuddleError {
    pub fn proposal_not_found(id: Uuid) -> Self {
        HuddleError::NotFound(format!("Proposal with ID {} not found", id))
    }

    pub fn slot_not_found(id: Uuid) -> Self {
        HuddleError::NotFound(format!("Slot with ID {} not found", id))
    }

    pub fn not_authorized() -> Self {
        HuddleError::Authorization("Not authorized".to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HuddleError::Validation(message.into())
    }

    /// True for failures the caller may retry unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, HuddleError::Database(_))
    }
}

impl From<Conflict> for HuddleError {
    fn from(conflict: Conflict) -> Self {
        HuddleError::Conflict(conflict)
    }
}

pub type HuddleResult<T> = Result<T, HuddleError>;
