//! # Relay Client
//!
//! HTTP client for the relay endpoints, used by the transaction view.
//!
//! # Examples
//!
//! ```ignore
//! use ether_relay::client::RelayClient;
//!
//! let relay = RelayClient::new("http://localhost:3001")?;
//! let result = relay.send_ether(&TransactionRequest::new(recipient, "0.5")).await?;
//! ```

use super::error::{ClientError, ClientResult};
use crate::api::rest::FailureResponse;
use crate::domain::entities::{TransactionRequest, TransactionResult};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout in milliseconds.
///
/// Relayed calls wait for inclusion, so this is generous.
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Relay operations the view depends on.
#[async_trait]
pub trait RelayApi: Send + Sync + fmt::Debug {
    /// Calls the liveness endpoint and returns its text.
    async fn health(&self) -> ClientResult<String>;

    /// Submits a transaction through the relay.
    async fn send_ether(&self, request: &TransactionRequest) -> ClientResult<TransactionResult>;
}

/// reqwest-based relay client.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout_ms(base_url, DEFAULT_TIMEOUT_MS)
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout_ms(base_url: impl Into<String>, timeout_ms: u64) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the relay base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl RelayApi for RelayClient {
    async fn health(&self) -> ClientResult<String> {
        let response = self.http.get(self.url("/")).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::relay(format!("liveness returned {status}")));
        }
        Ok(response.text().await?)
    }

    async fn send_ether(&self, request: &TransactionRequest) -> ClientResult<TransactionResult> {
        let response = self
            .http
            .post(self.url("/sendEther"))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let result: TransactionResult = serde_json::from_slice(&body)
                .map_err(|e| ClientError::relay(format!("invalid result body: {e}")))?;
            debug!(tx_hash = %result.tx_hash(), "Relay accepted transaction");
            return Ok(result);
        }

        match serde_json::from_slice::<FailureResponse>(&body) {
            Ok(failure) => {
                warn!(%status, message = %failure.message, "Relay rejected transaction");
                Err(ClientError::Rejected(failure.message))
            }
            Err(_) => Err(ClientError::relay(format!("relay returned {status}"))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn success_body() -> serde_json::Value {
        json!({
            "success": true,
            "txHash": "0xabc",
            "recipient": RECIPIENT,
            "amount": "0.5",
            "gasUsed": "21000",
            "gasCost": "0.000021"
        })
    }

    #[tokio::test]
    async fn health_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Server is running"))
            .mount(&server)
            .await;

        let client = RelayClient::new(server.uri()).unwrap();
        assert_eq!(client.health().await.unwrap(), "Server is running");
    }

    #[tokio::test]
    async fn send_ether_posts_request_and_decodes_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sendEther"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"recipient": RECIPIENT, "amount": "0.5"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = RelayClient::new(format!("{}/", server.uri())).unwrap();
        let result = client
            .send_ether(&TransactionRequest::new(RECIPIENT, "0.5"))
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.tx_hash(), "0xabc");
        assert_eq!(result.gas_cost(), "0.000021");
    }

    #[tokio::test]
    async fn send_ether_decodes_failure_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sendEther"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(json!({"success": false, "message": "Transaction failed"})),
            )
            .mount(&server)
            .await;

        let client = RelayClient::new(server.uri()).unwrap();
        let err = client
            .send_ether(&TransactionRequest::new(RECIPIENT, "1"))
            .await
            .unwrap_err();

        assert_eq!(err, ClientError::Rejected("Transaction failed".to_string()));
    }

    #[tokio::test]
    async fn send_ether_reports_unexpected_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sendEther"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let client = RelayClient::new(server.uri()).unwrap();
        let err = client
            .send_ether(&TransactionRequest::new(RECIPIENT, "1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Relay(_)));
    }

    #[tokio::test]
    async fn unreachable_relay_is_relay_error() {
        let client = RelayClient::with_timeout_ms("http://127.0.0.1:1", 500).unwrap();
        assert!(matches!(client.health().await, Err(ClientError::Relay(_))));
    }
}
