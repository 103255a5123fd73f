//! # Ethereum Client
//!
//! ethers-rs implementations of [`ChainClient`] and [`ChainEventSource`].
//!
//! Submissions go over HTTP, signed locally by wallets derived from a BIP-39
//! mnemonic. The event subscription runs over a WebSocket provider.
//!
//! # Examples
//!
//! ```ignore
//! use ether_relay::infrastructure::blockchain::{ChainConfig, EthersChainClient};
//!
//! let client = EthersChainClient::new(&config)?;
//! let accounts = client.accounts().await?;
//! ```

use super::client::{
    ChainClient, ChainError, ChainEventSource, ChainResult, ContractCall, EventFilterSpec,
    EventStream,
};
use super::config::ChainConfig;
use crate::domain::events::ChainEvent;
use async_trait::async_trait;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Middleware, Provider, Ws};
use ethers::signers::coins_bip39::English;
use ethers::signers::{LocalWallet, MnemonicBuilder, Signer};
use ethers::types::{
    Address, Filter, H256, Transaction, TransactionReceipt, TransactionRequest as CallRequest, U64,
};
use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

/// HTTP provider type alias.
pub type HttpProvider = Provider<Http>;

/// WebSocket provider type alias.
pub type WsProvider = Provider<Ws>;

// ============================================================================
// Chain Client
// ============================================================================

/// Chain client signing with mnemonic-derived wallets over HTTP.
#[derive(Clone)]
pub struct EthersChainClient {
    provider: HttpProvider,
    wallets: Arc<Vec<LocalWallet>>,
    chain_id: u64,
    rpc_url: String,
}

impl EthersChainClient {
    /// Creates a client from configuration.
    ///
    /// Derives `account_count` wallets from the mnemonic on the default
    /// Ethereum derivation path.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Connection` if the RPC URL is invalid and
    /// `ChainError::Credential` if the mnemonic cannot be used.
    pub fn new(config: &ChainConfig) -> ChainResult<Self> {
        let rpc_url = config
            .resolved_rpc_url()
            .map_err(|e| ChainError::connection(e.to_string()))?;
        let provider = Provider::<Http>::try_from(rpc_url.as_str())
            .map_err(|e| ChainError::connection(format!("failed to create provider: {e}")))?
            .interval(Duration::from_millis(config.poll_interval_ms));

        let mnemonic = config
            .require_mnemonic()
            .map_err(|e| ChainError::credential(e.to_string()))?;
        let wallets = derive_wallets(mnemonic, config.account_count, config.chain_id)?;

        info!(
            rpc_url = %redact_url(&rpc_url),
            accounts = wallets.len(),
            chain_id = config.chain_id,
            "Chain client ready"
        );

        Ok(Self {
            provider,
            wallets: Arc::new(wallets),
            chain_id: config.chain_id,
            rpc_url,
        })
    }

    /// Returns the chain id used for signing.
    #[inline]
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn wallet_for(&self, from: Address) -> ChainResult<LocalWallet> {
        self.wallets
            .iter()
            .find(|w| w.address() == from)
            .cloned()
            .ok_or(ChainError::UnknownAccount(from))
    }
}

impl fmt::Debug for EthersChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthersChainClient")
            .field("rpc_url", &redact_url(&self.rpc_url))
            .field("accounts", &self.wallets.len())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

#[async_trait]
impl ChainClient for EthersChainClient {
    async fn accounts(&self) -> ChainResult<Vec<Address>> {
        Ok(self.wallets.iter().map(|w| w.address()).collect())
    }

    async fn invoke(&self, call: ContractCall) -> ChainResult<H256> {
        let wallet = self.wallet_for(call.from)?;
        let signer = SignerMiddleware::new(self.provider.clone(), wallet);

        let mut request = CallRequest::new()
            .from(call.from)
            .to(call.contract)
            .data(call.calldata())
            .value(call.value);
        if let Some(gas) = call.gas {
            request = request.gas(gas);
        }

        let pending = signer
            .send_transaction(request, None)
            .await
            .map_err(|e| ChainError::submission(e.to_string()))?;
        let tx_hash = *pending;
        debug!(tx_hash = ?tx_hash, method = %call.signature, "Transaction broadcast");

        let receipt = pending
            .await
            .map_err(|e| ChainError::submission(e.to_string()))?
            .ok_or(ChainError::Dropped(tx_hash))?;

        if receipt.status == Some(U64::zero()) {
            return Err(ChainError::submission(format!(
                "transaction {tx_hash:#x} reverted"
            )));
        }

        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, hash: H256) -> ChainResult<Option<TransactionReceipt>> {
        self.provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| ChainError::lookup(format!("receipt {hash:#x}: {e}")))
    }

    async fn transaction(&self, hash: H256) -> ChainResult<Option<Transaction>> {
        self.provider
            .get_transaction(hash)
            .await
            .map_err(|e| ChainError::lookup(format!("transaction {hash:#x}: {e}")))
    }
}

// ============================================================================
// Event Source
// ============================================================================

/// Contract event source over a WebSocket provider.
///
/// The WebSocket connection is opened on [`ChainEventSource::subscribe`], so
/// an unreachable endpoint surfaces as a subscription failure.
#[derive(Clone)]
pub struct EthersEventSource {
    ws_url: String,
}

impl EthersEventSource {
    /// Creates an event source for the configured WebSocket endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Connection` if the URL references an unset
    /// environment variable.
    pub fn new(config: &ChainConfig) -> ChainResult<Self> {
        let ws_url = config
            .resolved_ws_url()
            .map_err(|e| ChainError::connection(e.to_string()))?;
        Ok(Self { ws_url })
    }
}

impl fmt::Debug for EthersEventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EthersEventSource")
            .field("ws_url", &redact_url(&self.ws_url))
            .finish()
    }
}

#[async_trait]
impl ChainEventSource for EthersEventSource {
    async fn subscribe(&self, filter: &EventFilterSpec) -> ChainResult<EventStream> {
        // eth_subscribe("logs") always starts at the chain head.
        let log_filter = Filter::new()
            .address(filter.contract)
            .topic0(filter.topic());
        let event_name = filter.name.clone();
        let provider = WsProvider::connect(self.ws_url.as_str())
            .await
            .map_err(|e| ChainError::subscription(format!("failed to connect websocket: {e}")))?;
        info!(ws_url = %redact_url(&self.ws_url), "Event source connected");

        let (ready_tx, ready_rx) = oneshot::channel::<ChainResult<()>>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut logs = match provider.subscribe_logs(&log_filter).await {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(ChainError::subscription(e.to_string())));
                    return;
                }
            };

            while let Some(log) = logs.next().await {
                let event = ChainEvent::from_record(&event_name, &log)
                    .map_err(|e| ChainError::subscription(format!("unserializable log: {e}")));
                if event_tx.send(event).is_err() {
                    break;
                }
            }

            warn!(event = %event_name, "Log subscription closed by provider");
        });

        ready_rx
            .await
            .map_err(|_| ChainError::subscription("subscription task exited"))??;

        Ok(UnboundedReceiverStream::new(event_rx).boxed())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Derives `count` wallets from a mnemonic, indices `0..count`.
///
/// # Errors
///
/// Returns `ChainError::Credential` if the mnemonic or a derivation fails.
pub fn derive_wallets(mnemonic: &str, count: u32, chain_id: u64) -> ChainResult<Vec<LocalWallet>> {
    (0..count)
        .map(|index| {
            MnemonicBuilder::<English>::default()
                .phrase(mnemonic)
                .index(index)
                .and_then(|builder| builder.build())
                .map(|wallet| wallet.with_chain_id(chain_id))
                .map_err(|e| ChainError::credential(format!("account {index}: {e}")))
        })
        .collect()
}

/// Hides the path of an RPC URL, where providers put their project keys.
#[must_use]
pub fn redact_url(url: &str) -> String {
    match url.find("://") {
        Some(scheme_end) => {
            let rest = &url[scheme_end + 3..];
            let host_end = rest.find('/').unwrap_or(rest.len());
            let suffix = if host_end < rest.len() { "/***" } else { "" };
            format!("{}{suffix}", &url[..scheme_end + 3 + host_end])
        }
        None => "***".to_string(),
    }
}
