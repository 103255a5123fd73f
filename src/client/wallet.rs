//! # Wallet Provider
//!
//! The user's own signer, used by the view to bypass the relay.

use super::error::{ClientError, ClientResult};
use crate::infrastructure::blockchain::{ChainClient, ContractCall};
use async_trait::async_trait;
use ethers::types::{Address, H256};
use std::fmt;
use std::sync::Arc;

/// A wallet able to list its accounts and sign contract calls.
#[async_trait]
pub trait WalletProvider: Send + Sync + fmt::Debug {
    /// Asks the wallet for its accounts.
    async fn request_accounts(&self) -> ClientResult<Vec<Address>>;

    /// Signs and sends a contract call, returning the transaction hash once
    /// it is included.
    async fn send_transaction(&self, call: ContractCall) -> ClientResult<H256>;
}

/// Wallet provider backed by a chain client holding local keys.
#[derive(Debug, Clone)]
pub struct ChainWallet {
    chain: Arc<dyn ChainClient>,
}

impl ChainWallet {
    /// Wraps a chain client.
    #[must_use]
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl WalletProvider for ChainWallet {
    async fn request_accounts(&self) -> ClientResult<Vec<Address>> {
        self.chain
            .accounts()
            .await
            .map_err(|e| ClientError::wallet(e.to_string()))
    }

    async fn send_transaction(&self, call: ContractCall) -> ClientResult<H256> {
        self.chain
            .invoke(call)
            .await
            .map_err(|e| ClientError::wallet(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::use_cases::tests::MockChainClient;
    use crate::infrastructure::blockchain::ChainError;

    #[tokio::test]
    async fn chain_wallet_lists_accounts() {
        let wallet = ChainWallet::new(Arc::new(MockChainClient::new()));
        let accounts = wallet.request_accounts().await.unwrap();
        assert_eq!(accounts[0], Address::repeat_byte(0xaa));
    }

    #[tokio::test]
    async fn chain_wallet_sends_through_chain() {
        let chain = Arc::new(MockChainClient::new());
        let wallet = ChainWallet::new(Arc::clone(&chain) as Arc<dyn ChainClient>);
        let call = ContractCall::new(Address::zero(), "sendEther(address)", Address::repeat_byte(0xaa));

        let hash = wallet.send_transaction(call).await.unwrap();

        assert_eq!(hash, chain.tx_hash());
        assert_eq!(chain.invoke_count(), 1);
    }

    #[tokio::test]
    async fn chain_wallet_maps_errors() {
        let wallet = ChainWallet::new(Arc::new(MockChainClient::failing_invoke(
            ChainError::submission("user rejected"),
        )));
        let call = ContractCall::new(Address::zero(), "sendEther(address)", Address::repeat_byte(0xaa));

        assert!(matches!(
            wallet.send_transaction(call).await,
            Err(ClientError::Wallet(_))
        ));
    }
}
