//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Empty user prompt detected, please write something.")]
    EmptyPrompt,

    #[error("Invalid model id: {0:?}")]
    InvalidModel(String),

    #[error("A response is already in progress for the last turn")]
    TurnInProgress,

    #[error("No response is in progress")]
    NoPendingTurn,
}

impl DomainError {
    /// Check if this error is caused by user input rather than program state
    pub fn is_user_error(&self) -> bool {
        matches!(self, DomainError::EmptyPrompt | DomainError::InvalidModel(_))
    }
}
