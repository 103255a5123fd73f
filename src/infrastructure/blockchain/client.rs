//! # Chain Client
//!
//! Adapter traits between the relay and a blockchain RPC provider.
//!
//! [`ChainClient`] covers account retrieval, contract invocation and
//! transaction lookup. [`ChainEventSource`] covers the contract event
//! subscription. Both are implemented over ethers-rs in
//! [`super::ethereum`] and mocked in tests.

use crate::domain::events::ChainEvent;
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, Bytes, H256, Transaction, TransactionReceipt, U256};
use futures::stream::BoxStream;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Chain client error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The RPC endpoint could not be reached or answered with an error.
    #[error("connection error: {0}")]
    Connection(String),

    /// The mnemonic or signer could not be used.
    #[error("credential error: {0}")]
    Credential(String),

    /// The sender is not one of the client's accounts.
    #[error("unknown account: {0:?}")]
    UnknownAccount(Address),

    /// Sending or mining the transaction failed.
    #[error("submission failed: {0}")]
    Submission(String),

    /// The transaction was dropped from the mempool before inclusion.
    #[error("transaction dropped: {0:#x}")]
    Dropped(H256),

    /// A receipt or transaction lookup failed.
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// The event subscription could not be opened or failed mid-stream.
    #[error("subscription failed: {0}")]
    Subscription(String),
}

impl ChainError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Creates a credential error.
    #[must_use]
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Creates a submission error.
    #[must_use]
    pub fn submission(message: impl Into<String>) -> Self {
        Self::Submission(message.into())
    }

    /// Creates a lookup error.
    #[must_use]
    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    /// Creates a subscription error.
    #[must_use]
    pub fn subscription(message: impl Into<String>) -> Self {
        Self::Subscription(message.into())
    }
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

// ============================================================================
// Contract Calls
// ============================================================================

/// A state-changing contract method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    /// Contract address.
    pub contract: Address,
    /// Method signature, e.g. `sendEther(address)`.
    pub signature: String,
    /// ABI arguments, in order.
    pub args: Vec<Token>,
    /// Sending account.
    pub from: Address,
    /// Wei attached to the call.
    pub value: U256,
    /// Gas limit; estimated by the provider when absent.
    pub gas: Option<U256>,
}

impl ContractCall {
    /// Creates a call with no arguments, no value and no gas limit.
    #[must_use]
    pub fn new(contract: Address, signature: impl Into<String>, from: Address) -> Self {
        Self {
            contract,
            signature: signature.into(),
            args: Vec::new(),
            from,
            value: U256::zero(),
            gas: None,
        }
    }

    /// Appends an ABI argument.
    #[must_use]
    pub fn arg(mut self, token: Token) -> Self {
        self.args.push(token);
        self
    }

    /// Sets the attached value in wei.
    #[must_use]
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Sets the gas limit.
    #[must_use]
    pub fn gas(mut self, gas: U256) -> Self {
        self.gas = Some(gas);
        self
    }

    /// Returns the 4-byte method selector.
    #[must_use]
    pub fn selector(&self) -> [u8; 4] {
        ethers::utils::id(&self.signature)
    }

    /// Encodes the selector followed by the ABI-encoded arguments.
    #[must_use]
    pub fn calldata(&self) -> Bytes {
        let encoded = ethers::abi::encode(&self.args);

        let mut calldata = Vec::with_capacity(4 + encoded.len());
        calldata.extend_from_slice(&self.selector());
        calldata.extend_from_slice(&encoded);

        Bytes::from(calldata)
    }
}

// ============================================================================
// Event Filters
// ============================================================================

/// Identifies one contract event to subscribe to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilterSpec {
    /// Emitting contract.
    pub contract: Address,
    /// Event name used when relaying, e.g. `EtherTransfer`.
    pub name: String,
    /// Event signature used for the topic, e.g. `EtherTransfer(address,address,uint256)`.
    pub signature: String,
}

impl EventFilterSpec {
    /// Creates a filter spec.
    #[must_use]
    pub fn new(contract: Address, name: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            contract,
            name: name.into(),
            signature: signature.into(),
        }
    }

    /// Returns the event topic: keccak256 of the signature.
    #[must_use]
    pub fn topic(&self) -> H256 {
        H256::from(ethers::utils::keccak256(self.signature.as_bytes()))
    }
}

/// Stream of relayed events.
pub type EventStream = BoxStream<'static, ChainResult<ChainEvent>>;

// ============================================================================
// Traits
// ============================================================================

/// Connected blockchain client able to sign for its own accounts.
#[async_trait]
pub trait ChainClient: Send + Sync + fmt::Debug {
    /// Lists the accounts this client can send from.
    async fn accounts(&self) -> ChainResult<Vec<Address>>;

    /// Sends a contract call and waits for it to be included in a block.
    ///
    /// Returns the transaction hash.
    async fn invoke(&self, call: ContractCall) -> ChainResult<H256>;

    /// Fetches a transaction receipt by hash.
    async fn transaction_receipt(&self, hash: H256) -> ChainResult<Option<TransactionReceipt>>;

    /// Fetches a transaction by hash.
    async fn transaction(&self, hash: H256) -> ChainResult<Option<Transaction>>;
}

/// Source of contract events.
#[async_trait]
pub trait ChainEventSource: Send + Sync + fmt::Debug {
    /// Subscribes to an event from the latest block onwards.
    ///
    /// # Errors
    ///
    /// Returns `ChainError::Subscription` if the subscription cannot be opened.
    async fn subscribe(&self, filter: &EventFilterSpec) -> ChainResult<EventStream>;
}
