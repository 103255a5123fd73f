//! # REST Routes
//!
//! Route definitions for the relay.
//!
//! # Route Structure
//!
//! ```text
//! /
//! ├── /            GET  - Liveness
//! ├── /sendEther   POST - Relay an Ether transfer
//! └── /ws          GET  - WebSocket event channel
//! ```
//!
//! # Examples
//!
//! ```ignore
//! use ether_relay::api::rest::routes::{cors_layer, create_router};
//!
//! let cors = cors_layer("http://localhost:5173")?;
//! let router = create_router(state, ws_state, cors, LoggingConfig::default());
//! axum::serve(listener, router).await?;
//! ```

use crate::api::middleware::logging::{LoggingConfig, create_logging_state, logging_middleware};
use crate::api::rest::handlers::{AppState, root, send_ether};
use crate::api::websocket::{WebSocketState, create_ws_router};
use axum::http::header::{CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderValue, Method};
use axum::{Router, routing::get, routing::post};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the CORS layer for a single allowed origin.
///
/// Allows `GET` and `POST` with a `Content-Type` header.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]))
}

/// Creates the relay router with all endpoints and middleware.
///
/// # Arguments
///
/// * `state` - Shared state for the REST handlers
/// * `ws_state` - Shared state for WebSocket connections
/// * `cors` - CORS policy, see [`cors_layer`]
/// * `logging` - Request logging options
pub fn create_router(
    state: Arc<AppState>,
    ws_state: Arc<WebSocketState>,
    cors: CorsLayer,
    logging: LoggingConfig,
) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/sendEther", post(send_ether))
        .with_state(state)
        .merge(create_ws_router(ws_state))
        .layer(axum::middleware::from_fn_with_state(
            create_logging_state(logging),
            logging_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates a minimal router for testing without middleware.
///
/// This is useful for unit tests where you don't need tracing or CORS.
#[cfg(test)]
pub fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/sendEther", post(send_ether))
        .with_state(state)
}
