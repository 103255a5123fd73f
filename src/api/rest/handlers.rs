//! # REST Handlers
//!
//! Request handlers for the relay's HTTP endpoints.
//!
//! # Endpoints
//!
//! - `GET /` - Liveness, answers `Server is running`
//! - `POST /sendEther` - Relay an Ether transfer through the contract
//!
//! Every failure of `POST /sendEther` answers `500` with
//! `{"success": false, "message": ...}`. Validation failures carry their
//! own message; everything else is reported as `Transaction failed` and the
//! detailed error is logged.

use crate::application::error::ApplicationError;
use crate::application::use_cases::SendEtherUseCase;
use crate::domain::entities::{TransactionRequest, TransactionResult};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument, warn};

/// Liveness answer of `GET /`.
pub const LIVENESS_MESSAGE: &str = "Server is running";

/// Generic failure message for non-validation errors.
pub const TRANSACTION_FAILED: &str = "Transaction failed";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for REST handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Relay use case.
    pub send_ether: SendEtherUseCase,
}

impl AppState {
    /// Creates a new state.
    #[must_use]
    pub fn new(send_ether: SendEtherUseCase) -> Self {
        Self { send_ether }
    }
}

// ============================================================================
// Failure Response
// ============================================================================

/// Failure body of the relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    /// Always false.
    pub success: bool,
    /// Human-readable failure message.
    pub message: String,
}

impl FailureResponse {
    /// Creates a failure response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<ApplicationError> for (StatusCode, Json<FailureResponse>) {
    fn from(err: ApplicationError) -> Self {
        let message = match err {
            ApplicationError::ValidationError(message) => message,
            _ => TRANSACTION_FAILED.to_string(),
        };

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FailureResponse::new(message)),
        )
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness check.
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

/// Relays an Ether transfer.
///
/// # Errors
///
/// Returns `500` with a [`FailureResponse`] if the body is malformed,
/// validation fails or the chain call fails.
#[instrument(skip(state, payload))]
pub async fn send_ether(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResult>, (StatusCode, Json<FailureResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected request body");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(FailureResponse::new("invalid request body")),
        )
    })?;

    state.send_ether.execute(request).await.map(Json).map_err(|e| {
        if e.is_validation() {
            warn!(error = %e, "Rejected transaction request");
        } else {
            error!(error = %e, "Transaction failed");
        }
        e.into()
    })
}
