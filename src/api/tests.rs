//! # API Integration Tests
//!
//! Router-level tests for the relay endpoints, CORS policy, request ids
//! and the WebSocket route.
//!
//! # Test Categories
//!
//! - **Liveness**: `GET /`
//! - **Relay**: `POST /sendEther` success and failure bodies
//! - **Middleware**: CORS and request id headers

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::middleware::logging::LoggingConfig;
use crate::api::rest::handlers::AppState;
use crate::api::rest::routes::{cors_layer, create_router, create_test_router};
use crate::api::websocket::WebSocketState;
use crate::application::services::SubscriberRegistry;
use crate::application::use_cases::tests::{MockChainClient, RECIPIENT, use_case};
use crate::infrastructure::blockchain::ChainError;

// ============================================================================
// Test Helpers
// ============================================================================

const ORIGIN: &str = "http://localhost:5173";

fn state(chain: Arc<MockChainClient>) -> Arc<AppState> {
    Arc::new(AppState::new(use_case(chain)))
}

fn full_router(chain: Arc<MockChainClient>) -> Router {
    create_router(
        state(chain),
        Arc::new(WebSocketState::new(SubscriberRegistry::new())),
        cors_layer(ORIGIN).unwrap(),
        LoggingConfig::default(),
    )
}

fn post_json(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/sendEther")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test]
async fn root_reports_running() {
    let response = create_test_router(state(Arc::new(MockChainClient::new())))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Server is running");
}

// ============================================================================
// Relay
// ============================================================================

#[tokio::test]
async fn send_ether_returns_result() {
    let chain = Arc::new(MockChainClient::new());
    let body = json!({"recipient": RECIPIENT, "amount": "0.5"}).to_string();

    let response = create_test_router(state(Arc::clone(&chain)))
        .oneshot(post_json(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["txHash"], format!("{:#x}", chain.tx_hash()));
    assert_eq!(json["recipient"], RECIPIENT);
    assert_eq!(json["amount"], "0.5");
    assert_eq!(json["gasUsed"], "21000");
    assert_eq!(json["gasCost"], "0.000021");
    assert_eq!(chain.invoke_count(), 1);
}

#[tokio::test]
async fn empty_recipient_fails_without_chain_call() {
    let chain = Arc::new(MockChainClient::new());
    let body = json!({"recipient": "", "amount": "0.5"}).to_string();

    let response = create_test_router(state(Arc::clone(&chain)))
        .oneshot(post_json(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "missing required field: recipient");
    assert_eq!(chain.invoke_count(), 0);
}

#[tokio::test]
async fn missing_amount_field_fails_without_chain_call() {
    let chain = Arc::new(MockChainClient::new());
    let body = json!({"recipient": RECIPIENT}).to_string();

    let response = create_test_router(state(Arc::clone(&chain)))
        .oneshot(post_json(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["success"], false);
    assert_eq!(chain.invoke_count(), 0);
}

#[tokio::test]
async fn malformed_json_yields_failure_body() {
    let chain = Arc::new(MockChainClient::new());
    let response = create_test_router(state(Arc::clone(&chain)))
        .oneshot(post_json("{recipient:"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["message"].is_string());
    assert_eq!(chain.invoke_count(), 0);
}

#[tokio::test]
async fn oversized_amount_yields_failure_body() {
    let chain = Arc::new(MockChainClient::new());
    let body = json!({"recipient": RECIPIENT, "amount": "9".repeat(70)}).to_string();

    let response = create_test_router(state(Arc::clone(&chain)))
        .oneshot(post_json(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(
        json["message"]
            .as_str()
            .unwrap()
            .starts_with("invalid ether amount")
    );
    assert_eq!(chain.invoke_count(), 0);
}

#[tokio::test]
async fn chain_failure_is_reported_generically() {
    let chain = Arc::new(MockChainClient::failing_invoke(ChainError::submission(
        "execution reverted: insufficient funds",
    )));
    let body = json!({"recipient": RECIPIENT, "amount": "1"}).to_string();

    let response = create_test_router(state(chain))
        .oneshot(post_json(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"success": false, "message": "Transaction failed"})
    );
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn cors_allows_configured_origin() {
    let response = full_router(Arc::new(MockChainClient::new()))
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/sendEther")
                .header(header::ORIGIN, ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        ORIGIN
    );
}

#[tokio::test]
async fn cors_never_echoes_other_origins() {
    let response = full_router(Arc::new(MockChainClient::new()))
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let allowed = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .unwrap();
    assert_eq!(allowed, ORIGIN);
    assert_ne!(allowed, "http://evil.example");
}

#[tokio::test]
async fn full_router_sets_request_id() {
    let response = full_router(Arc::new(MockChainClient::new()))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn ws_route_is_mounted() {
    let response = full_router(Arc::new(MockChainClient::new()))
        .oneshot(Request::builder().uri("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::NOT_FOUND);
}
