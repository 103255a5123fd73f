//! # Transaction Entities
//!
//! The relay's request and result records.
//!
//! A [`TransactionRequest`] is what a client submits: a recipient address
//! and an ether amount, both as strings. A [`TransactionResult`] is built
//! once the transaction has been mined, from its receipt and the
//! transaction itself.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::ether::{EtherAmount, gas_cost};
use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A request to send Ether to a recipient through the contract.
///
/// Missing JSON fields deserialize as empty strings so that they fail
/// [`TransactionRequest::validate`] instead of the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Recipient address as submitted.
    #[serde(default)]
    pub recipient: String,
    /// Amount in ether as submitted.
    #[serde(default)]
    pub amount: String,
}

impl TransactionRequest {
    /// Creates a new request.
    #[must_use]
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Checks that both fields are present.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` naming the first empty field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.recipient.trim().is_empty() {
            return Err(DomainError::MissingField("recipient".to_string()));
        }
        if self.amount.trim().is_empty() {
            return Err(DomainError::MissingField("amount".to_string()));
        }
        Ok(())
    }

    /// Parses the recipient into an address.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAddress` if it is not 20 hex bytes.
    pub fn recipient_address(&self) -> DomainResult<Address> {
        Address::from_str(self.recipient.trim())
            .map_err(|_| DomainError::InvalidAddress(self.recipient.clone()))
    }

    /// Parses the amount into wei.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if it is not an ether decimal.
    pub fn ether_amount(&self) -> DomainResult<EtherAmount> {
        EtherAmount::parse(&self.amount)
    }
}

/// The outcome of a relayed transaction, as returned to clients.
///
/// Serialized in camelCase: `success`, `txHash`, `recipient`, `amount`,
/// `gasUsed`, `gasCost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    success: bool,
    tx_hash: String,
    recipient: String,
    amount: String,
    gas_used: String,
    gas_cost: String,
}

impl TransactionResult {
    /// Builds a successful result from mined transaction data.
    ///
    /// `recipient` and `amount` are echoed from the request unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the gas cost overflows or cannot be rendered.
    pub fn from_receipt(
        request: &TransactionRequest,
        tx_hash: H256,
        gas_used: U256,
        gas_price: U256,
    ) -> DomainResult<Self> {
        let cost = gas_cost(gas_used, gas_price)?;

        Ok(Self {
            success: true,
            tx_hash: format!("{tx_hash:#x}"),
            recipient: request.recipient.clone(),
            amount: request.amount.clone(),
            gas_used: gas_used.to_string(),
            gas_cost: cost.to_ether_string()?,
        })
    }

    /// Returns true for a successful transaction.
    #[inline]
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Returns the 0x-prefixed transaction hash.
    #[inline]
    #[must_use]
    pub fn tx_hash(&self) -> &str {
        &self.tx_hash
    }

    /// Returns the recipient as submitted.
    #[inline]
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Returns the amount as submitted.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// Returns the gas used, in gas units.
    #[inline]
    #[must_use]
    pub fn gas_used(&self) -> &str {
        &self.gas_used
    }

    /// Returns the fee paid, in ether.
    #[inline]
    #[must_use]
    pub fn gas_cost(&self) -> &str {
        &self.gas_cost
    }
}
