//! Error types for the Validator.

use feedcheck_core::Rejection;
use thiserror::Error;

/// Errors that can occur during Validator operations.
#[derive(Debug, Error)]
pub enum FeedcheckError {
    /// A message failed validation.
    #[error("{0}")]
    Rejected(#[from] Rejection),

    /// The blocking validation task panicked or was cancelled.
    #[error("validation task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl FeedcheckError {
    /// The rejection, if the failure came from validation.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            FeedcheckError::Rejected(rejection) => Some(rejection),
            FeedcheckError::TaskFailed(_) => None,
        }
    }
}

/// Result type for Validator operations.
pub type Result<T> = std::result::Result<T, FeedcheckError>;
