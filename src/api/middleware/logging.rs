//! # Logging Middleware
//!
//! Request/response logging with structured fields.
//!
//! Every request is logged once on completion with its request id, method,
//! path, status and duration. The request id is taken from the incoming
//! `X-Request-ID` header when present, generated otherwise, and echoed on
//! the response.
//!
//! # Usage
//!
//! ```ignore
//! use ether_relay::api::middleware::logging::{
//!     LoggingConfig, create_logging_state, logging_middleware,
//! };
//!
//! let app = Router::new()
//!     .route("/", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(
//!         create_logging_state(LoggingConfig::default()),
//!         logging_middleware,
//!     ));
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Span, debug, error, info, instrument, warn};
use uuid::Uuid;

// ============================================================================
// Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Whether to log request headers at debug level.
    pub log_headers: bool,
    /// Headers to redact from logs.
    pub redacted_headers: Vec<String>,
    /// Header name for request ID.
    pub request_id_header: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_headers: false,
            redacted_headers: vec!["authorization".to_string(), "cookie".to_string()],
            request_id_header: "X-Request-ID".to_string(),
        }
    }
}

// ============================================================================
// Request ID
// ============================================================================

/// A unique request identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generates a new random request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a request ID from an existing string.
    #[must_use]
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Redacts sensitive values from headers.
#[must_use]
pub fn redact_headers(headers: &HeaderMap, redacted_names: &[String]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let redacted = redacted_names
                .iter()
                .any(|r| r.eq_ignore_ascii_case(name.as_str()));
            let value_str = if redacted {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.as_str().to_string(), value_str)
        })
        .collect()
}

// ============================================================================
// Middleware
// ============================================================================

/// Shared state for logging middleware.
#[derive(Debug, Clone, Default)]
pub struct LoggingState {
    /// Configuration.
    pub config: LoggingConfig,
}

impl LoggingState {
    /// Creates a new logging state.
    #[must_use]
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }
}

/// Logging middleware function.
///
/// Logs request and response information with structured fields.
#[instrument(skip_all, fields(request_id))]
pub async fn logging_middleware(
    State(state): State<Arc<LoggingState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let request_id = request
        .headers()
        .get(&state.config.request_id_header)
        .and_then(|v| v.to_str().ok())
        .map(RequestId::from_string)
        .unwrap_or_default();

    Span::current().record("request_id", request_id.as_str());
    request.extensions_mut().insert(request_id.clone());

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    if state.config.log_headers {
        let headers = redact_headers(request.headers(), &state.config.redacted_headers);
        debug!(method = %method, path = %path, headers = ?headers, "Request headers");
    }

    let mut response = next.run(request).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    if let Ok(value) = HeaderValue::from_str(request_id.as_str())
        && let Ok(name) = HeaderName::from_bytes(state.config.request_id_header.as_bytes())
    {
        response.headers_mut().insert(name, value);
    }

    let status = response.status();
    if status.is_success() || status.is_redirection() || status.is_informational() {
        info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "Request completed"
        );
    } else if status.is_client_error() {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "Client error"
        );
    } else {
        error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms,
            "Server error"
        );
    }

    response
}

/// Creates a logging state for use with middleware.
#[must_use]
pub fn create_logging_state(config: LoggingConfig) -> Arc<LoggingState> {
    Arc::new(LoggingState::new(config))
}
