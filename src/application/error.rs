//! # Application Errors
//!
//! Error types for the application layer.
//!
//! These errors represent failures that can occur while relaying a
//! transaction or running the event bridge. None of them are retried.

use crate::domain::errors::DomainError;
use crate::infrastructure::blockchain::ChainError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Request validation failed; no chain call was attempted.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The chain client controls no accounts.
    #[error("no sending account available")]
    NoAccount,

    /// Submitting or mining the transaction failed.
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// The transaction was mined but its receipt or body could not be read.
    #[error("transaction data unavailable: {0}")]
    TransactionUnavailable(String),

    /// The event subscription failed.
    #[error("subscription failed: {0}")]
    SubscriptionFailed(String),

    /// Chain client error outside submission.
    #[error("chain error: {0}")]
    Chain(ChainError),

    /// Domain error.
    #[error("domain error: {0}")]
    DomainError(DomainError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Creates a submission error.
    #[must_use]
    pub fn submission(message: impl Into<String>) -> Self {
        Self::SubmissionFailed(message.into())
    }

    /// Creates a transaction unavailable error.
    #[must_use]
    pub fn transaction_unavailable(message: impl Into<String>) -> Self {
        Self::TransactionUnavailable(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if the request was rejected before touching the chain.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        if err.is_validation_error() {
            Self::ValidationError(err.to_string())
        } else {
            Self::DomainError(err)
        }
    }
}

impl From<ChainError> for ApplicationError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Submission(_) | ChainError::Dropped(_) | ChainError::UnknownAccount(_) => {
                Self::SubmissionFailed(err.to_string())
            }
            ChainError::Subscription(_) => Self::SubscriptionFailed(err.to_string()),
            other => Self::Chain(other),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
