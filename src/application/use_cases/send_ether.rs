//! # Send Ether Use Case
//!
//! Relays a [`TransactionRequest`] to the contract's payable transfer method.
//!
//! This module provides the [`SendEtherUseCase`] which validates the
//! request, submits the contract call from the first available account and
//! prices the mined transaction.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::{TransactionRequest, TransactionResult};
use crate::infrastructure::blockchain::{ChainClient, ContractCall};
use ethers::abi::Token;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Use case for relaying Ether transfers through the contract.
///
/// Orchestrates the relay workflow:
/// 1. Validate the request
/// 2. Resolve the sending account
/// 3. Submit `method(recipient)` with the amount attached as value
/// 4. Fetch the receipt and the transaction
/// 5. Compute the gas cost
///
/// Nothing is retried. Resubmitting the same request sends Ether again.
#[derive(Debug, Clone)]
pub struct SendEtherUseCase {
    chain: Arc<dyn ChainClient>,
    contract: Address,
    method: String,
    gas_limit: U256,
}

impl SendEtherUseCase {
    /// Creates a new SendEtherUseCase.
    #[must_use]
    pub fn new(
        chain: Arc<dyn ChainClient>,
        contract: Address,
        method: impl Into<String>,
        gas_limit: U256,
    ) -> Self {
        Self {
            chain,
            contract,
            method: method.into(),
            gas_limit,
        }
    }

    /// Returns the contract the relay calls.
    #[inline]
    #[must_use]
    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Relays the request and returns the priced result.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A field is empty or cannot be parsed (no chain call is made)
    /// - The chain client has no accounts
    /// - Submission fails or the transaction reverts
    /// - The receipt or transaction cannot be fetched
    #[instrument(skip(self, request), fields(recipient = %request.recipient, amount = %request.amount))]
    pub async fn execute(&self, request: TransactionRequest) -> ApplicationResult<TransactionResult> {
        request.validate()?;
        let recipient = request.recipient_address()?;
        let amount = request.ether_amount()?;

        let from = self
            .chain
            .accounts()
            .await?
            .first()
            .copied()
            .ok_or(ApplicationError::NoAccount)?;

        let call = ContractCall::new(self.contract, self.method.as_str(), from)
            .arg(Token::Address(recipient))
            .value(amount.wei())
            .gas(self.gas_limit);

        let tx_hash = self.chain.invoke(call).await?;
        debug!(tx_hash = ?tx_hash, from = ?from, "Transaction mined");

        let receipt = self
            .chain
            .transaction_receipt(tx_hash)
            .await?
            .ok_or_else(|| {
                ApplicationError::transaction_unavailable(format!("no receipt for {tx_hash:#x}"))
            })?;
        let transaction = self.chain.transaction(tx_hash).await?.ok_or_else(|| {
            ApplicationError::transaction_unavailable(format!("no transaction for {tx_hash:#x}"))
        })?;

        let gas_used = receipt.gas_used.ok_or_else(|| {
            ApplicationError::transaction_unavailable(format!("receipt {tx_hash:#x} has no gas used"))
        })?;
        let gas_price = transaction
            .gas_price
            .or(receipt.effective_gas_price)
            .ok_or_else(|| {
                ApplicationError::transaction_unavailable(format!(
                    "transaction {tx_hash:#x} has no gas price"
                ))
            })?;

        let result = TransactionResult::from_receipt(&request, tx_hash, gas_used, gas_price)?;

        info!(
            tx_hash = %result.tx_hash(),
            gas_used = %result.gas_used(),
            gas_cost = %result.gas_cost(),
            "Ether relayed"
        );

        Ok(result)
    }
}
