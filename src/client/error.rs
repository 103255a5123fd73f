//! # Client Errors
//!
//! Failures of the transaction view, its relay client and wallet provider.

use thiserror::Error;

/// Client error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// No wallet provider is available.
    #[error("no wallet provider available")]
    ProviderUnavailable,

    /// The wallet is not connected.
    #[error("wallet not connected")]
    NotConnected,

    /// A submission is already in progress.
    #[error("a submission is already in progress")]
    Busy,

    /// A form field is empty or invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// The relay could not be reached or answered unexpectedly.
    #[error("relay error: {0}")]
    Relay(String),

    /// The relay answered with a failure body.
    #[error("relay rejected transaction: {0}")]
    Rejected(String),

    /// The wallet provider failed.
    #[error("wallet error: {0}")]
    Wallet(String),
}

impl ClientError {
    /// Creates a relay error.
    #[must_use]
    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay(message.into())
    }

    /// Creates a wallet error.
    #[must_use]
    pub fn wallet(message: impl Into<String>) -> Self {
        Self::Wallet(message.into())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Relay(err.to_string())
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
