//! # Relay End-to-End Tests
//!
//! Runs the full router on a local port over a mock chain and drives it
//! through the public client types and a real WebSocket connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ether_relay::api::middleware::logging::LoggingConfig;
use ether_relay::api::rest::handlers::AppState;
use ether_relay::api::rest::routes::{cors_layer, create_router};
use ether_relay::api::websocket::WebSocketState;
use ether_relay::application::{EventBridge, SendEtherUseCase, SubscriberRegistry};
use ether_relay::client::{
    ChainWallet, ClientError, EventFeed, RelayApi, RelayClient, TransactionView, ViewState,
    WalletProvider, WalletSession,
};
use ether_relay::domain::entities::TransactionRequest;
use ether_relay::domain::events::ChainEvent;
use ether_relay::infrastructure::blockchain::{
    ChainClient, ChainConfig, ChainEventSource, ChainResult, ContractCall, EthersEventSource,
    EventFilterSpec, EventStream,
};
use ethers::types::{Address, H256, Transaction, TransactionReceipt, U256};
use futures::StreamExt;
use tokio_tungstenite::connect_async;

const RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
const METHOD: &str = "sendEther(address)";

// ============================================================================
// Test Doubles
// ============================================================================

#[derive(Debug, Default)]
struct LocalChain {
    invocations: AtomicUsize,
}

impl LocalChain {
    fn hash() -> H256 {
        H256::repeat_byte(0x11)
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainClient for LocalChain {
    async fn accounts(&self) -> ChainResult<Vec<Address>> {
        Ok(vec![Address::repeat_byte(0xaa)])
    }

    async fn invoke(&self, _call: ContractCall) -> ChainResult<H256> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(Self::hash())
    }

    async fn transaction_receipt(&self, hash: H256) -> ChainResult<Option<TransactionReceipt>> {
        Ok(Some(TransactionReceipt {
            transaction_hash: hash,
            gas_used: Some(U256::from(50_000u64)),
            ..TransactionReceipt::default()
        }))
    }

    async fn transaction(&self, hash: H256) -> ChainResult<Option<Transaction>> {
        Ok(Some(Transaction {
            hash,
            gas_price: Some(U256::from(20_000_000_000u64)),
            ..Transaction::default()
        }))
    }
}

#[derive(Debug)]
struct ScriptedEvents(Vec<ChainEvent>);

#[async_trait]
impl ChainEventSource for ScriptedEvents {
    async fn subscribe(&self, _filter: &EventFilterSpec) -> ChainResult<EventStream> {
        Ok(futures::stream::iter(self.0.clone().into_iter().map(Ok)).boxed())
    }
}

fn contract() -> Address {
    Address::repeat_byte(0xc0)
}

async fn spawn_relay(chain: Arc<LocalChain>, registry: SubscriberRegistry) -> String {
    let use_case = SendEtherUseCase::new(chain, contract(), METHOD, U256::from(2_000_000u64));
    let router = create_router(
        Arc::new(AppState::new(use_case)),
        Arc::new(WebSocketState::new(registry)),
        cors_layer("http://localhost:5173").unwrap(),
        LoggingConfig::default(),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}

// ============================================================================
// Relay Round Trips
// ============================================================================

#[tokio::test]
async fn relay_client_reaches_running_server() {
    let base = spawn_relay(Arc::new(LocalChain::default()), SubscriberRegistry::new()).await;
    let client = RelayClient::new(base).unwrap();

    assert_eq!(client.health().await.unwrap(), "Server is running");
}

#[tokio::test]
async fn relay_client_receives_priced_result() {
    let chain = Arc::new(LocalChain::default());
    let base = spawn_relay(Arc::clone(&chain), SubscriberRegistry::new()).await;
    let client = RelayClient::new(base).unwrap();

    let result = client
        .send_ether(&TransactionRequest::new(RECIPIENT, "0.25"))
        .await
        .unwrap();

    assert!(result.success());
    assert_eq!(result.tx_hash(), format!("{:#x}", LocalChain::hash()));
    assert_eq!(result.gas_used(), "50000");
    assert_eq!(result.gas_cost(), "0.001");
    assert_eq!(chain.invocations(), 1);
}

#[tokio::test]
async fn relay_client_surfaces_validation_message() {
    let chain = Arc::new(LocalChain::default());
    let base = spawn_relay(Arc::clone(&chain), SubscriberRegistry::new()).await;
    let client = RelayClient::new(base).unwrap();

    let err = client
        .send_ether(&TransactionRequest::new(RECIPIENT, ""))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Rejected("missing required field: amount".to_string())
    );
    assert_eq!(chain.invocations(), 0);
}

// ============================================================================
// Event Channel
// ============================================================================

const TRANSFER: &str = r#"{"from":"0xaa","to":"0xbb","amount":"250000000000000000"}"#;

fn transfer_filter() -> EventFilterSpec {
    EventFilterSpec::new(
        contract(),
        "EtherTransfer",
        "EtherTransfer(address,address,uint256)",
    )
}

async fn bridge_once(registry: SubscriberRegistry) {
    let transfer = ChainEvent::from_json("EtherTransfer", TRANSFER).unwrap();
    EventBridge::new(
        Arc::new(ScriptedEvents(vec![transfer])),
        registry,
        transfer_filter(),
    )
    .run()
    .await
    .unwrap();
}

async fn wait_for_subscribers(registry: &SubscriberRegistry, expected: usize) {
    for _ in 0..200 {
        if registry.len().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(registry.len().await, expected);
}

#[tokio::test]
async fn ws_channel_relays_frames_and_unregisters_on_close() {
    let registry = SubscriberRegistry::new();
    let base = spawn_relay(Arc::new(LocalChain::default()), registry.clone()).await;

    let (mut socket, _) = connect_async(format!("{}/ws", base.replace("http://", "ws://")))
        .await
        .unwrap();
    wait_for_subscribers(&registry, 1).await;

    bridge_once(registry.clone()).await;

    let frame = socket.next().await.unwrap().unwrap();
    assert_eq!(
        frame.to_text().unwrap(),
        format!(r#"{{"type":"event","event":"EtherTransfer","payload":{TRANSFER}}}"#)
    );

    socket.close(None).await.unwrap();
    wait_for_subscribers(&registry, 0).await;
}

#[tokio::test]
async fn unreachable_event_endpoint_leaves_relay_serving() {
    let registry = SubscriberRegistry::new();
    let base = spawn_relay(Arc::new(LocalChain::default()), registry.clone()).await;

    let source = EthersEventSource::new(&ChainConfig {
        ws_url: "ws://127.0.0.1:1".to_string(),
        ..ChainConfig::default()
    })
    .unwrap();
    EventBridge::new(Arc::new(source), registry, transfer_filter())
        .spawn()
        .await
        .unwrap();

    let client = RelayClient::new(base).unwrap();
    assert_eq!(client.health().await.unwrap(), "Server is running");
    let result = client
        .send_ether(&TransactionRequest::new(RECIPIENT, "0.25"))
        .await
        .unwrap();
    assert!(result.success());
}

// ============================================================================
// Transaction View
// ============================================================================

#[tokio::test]
async fn view_submits_through_relay_and_logs_channel_events() {
    let chain = Arc::new(LocalChain::default());
    let registry = SubscriberRegistry::new();
    let base = spawn_relay(Arc::clone(&chain), registry.clone()).await;

    let wallet: Arc<dyn WalletProvider> =
        Arc::new(ChainWallet::new(Arc::clone(&chain) as Arc<dyn ChainClient>));
    let feed = EventFeed::connect(&base).await.unwrap();
    wait_for_subscribers(&registry, 1).await;
    let mut view = TransactionView::new(
        WalletSession::new(),
        Arc::new(RelayClient::new(base).unwrap()),
        Some(wallet),
        contract(),
        METHOD,
    )
    .with_events(feed);

    view.connect().await.unwrap();
    assert_eq!(view.state(), ViewState::WalletConnected);

    view.set_recipient(RECIPIENT);
    view.set_amount("0.25");
    view.submit_via_relay().await.unwrap();

    let info = view.transaction_info().unwrap();
    assert_eq!(info.recipient(), RECIPIENT);
    assert_eq!(view.state(), ViewState::Idle);

    bridge_once(registry).await;

    let mut received = 0;
    for _ in 0..200 {
        received += view.drain_events();
        if received > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(received, 1);
    assert_eq!(view.logs()[0].name(), "EtherTransfer");
    assert_eq!(view.logs()[0].payload_json(), TRANSFER);
}
