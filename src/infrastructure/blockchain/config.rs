//! # Chain Configuration
//!
//! Network endpoints, credentials and contract coordinates for the relay.
//!
//! RPC URLs may reference environment variables with `${VAR}` so that the
//! provider project id stays out of config files:
//!
//! ```toml
//! [chain]
//! rpc_url = "https://sepolia.infura.io/v3/${INFURA_PROJECT_ID}"
//! ws_url = "wss://sepolia.infura.io/ws/v3/${INFURA_PROJECT_ID}"
//! contract_address = "0x1dE0aB01CCe1784f9864660f102c0470F75356aD"
//! ```

use super::client::EventFilterSpec;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ChainConfigError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Environment variable not set.
    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ChainConfigError>;

/// Blockchain and contract configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// HTTP RPC endpoint used for accounts and submissions.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// WebSocket RPC endpoint used for the event subscription.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Chain id used when signing.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Wallet mnemonic. Never serialized.
    #[serde(default, skip_serializing)]
    pub mnemonic: Option<String>,
    /// Number of accounts derived from the mnemonic.
    #[serde(default = "default_account_count")]
    pub account_count: u32,
    /// Deployed contract address.
    #[serde(default = "default_contract_address")]
    pub contract_address: String,
    /// Payable method invoked by the relay.
    #[serde(default = "default_transfer_method")]
    pub transfer_method: String,
    /// Name under which events are relayed.
    #[serde(default = "default_event_name")]
    pub event_name: String,
    /// Event signature used to build the log filter.
    #[serde(default = "default_event_signature")]
    pub event_signature: String,
    /// Gas limit attached to relayed calls.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Pending transaction polling interval in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            ws_url: default_ws_url(),
            chain_id: default_chain_id(),
            mnemonic: None,
            account_count: default_account_count(),
            contract_address: default_contract_address(),
            transfer_method: default_transfer_method(),
            event_name: default_event_name(),
            event_signature: default_event_signature(),
            gas_limit: default_gas_limit(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url)
            .field("ws_url", &self.ws_url)
            .field("chain_id", &self.chain_id)
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "[REDACTED]"))
            .field("account_count", &self.account_count)
            .field("contract_address", &self.contract_address)
            .field("transfer_method", &self.transfer_method)
            .field("event_name", &self.event_name)
            .field("event_signature", &self.event_signature)
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

impl ChainConfig {
    /// Returns the parsed contract address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is not valid hex.
    pub fn contract(&self) -> ConfigResult<Address> {
        Address::from_str(&self.contract_address).map_err(|_| {
            ChainConfigError::Invalid(format!("contract_address: {}", self.contract_address))
        })
    }

    /// Returns the gas limit as a `U256`.
    #[must_use]
    pub fn gas(&self) -> U256 {
        U256::from(self.gas_limit)
    }

    /// Returns the HTTP RPC URL with environment variables substituted.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced variable is not set.
    pub fn resolved_rpc_url(&self) -> ConfigResult<String> {
        substitute_env_vars(&self.rpc_url)
    }

    /// Returns the WebSocket RPC URL with environment variables substituted.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced variable is not set.
    pub fn resolved_ws_url(&self) -> ConfigResult<String> {
        substitute_env_vars(&self.ws_url)
    }

    /// Returns the mnemonic.
    ///
    /// # Errors
    ///
    /// Returns an error if no mnemonic is configured.
    pub fn require_mnemonic(&self) -> ConfigResult<&str> {
        self.mnemonic
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| ChainConfigError::MissingField("mnemonic".to_string()))
    }

    /// Returns the filter for the relayed event.
    ///
    /// # Errors
    ///
    /// Returns an error if the contract address is invalid.
    pub fn event_filter(&self) -> ConfigResult<EventFilterSpec> {
        Ok(EventFilterSpec::new(
            self.contract()?,
            &self.event_name,
            &self.event_signature,
        ))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rpc_url.is_empty() {
            return Err(ChainConfigError::MissingField("rpc_url".to_string()));
        }
        if self.ws_url.is_empty() {
            return Err(ChainConfigError::MissingField("ws_url".to_string()));
        }
        self.contract()?;
        self.require_mnemonic()?;

        if self.account_count == 0 {
            return Err(ChainConfigError::Invalid(
                "account_count must be greater than 0".to_string(),
            ));
        }
        if self.gas_limit == 0 {
            return Err(ChainConfigError::Invalid(
                "gas_limit must be greater than 0".to_string(),
            ));
        }
        if !self.transfer_method.contains('(') || !self.event_signature.contains('(') {
            return Err(ChainConfigError::Invalid(
                "method and event signatures must include a parameter list".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_rpc_url() -> String {
    "https://sepolia.infura.io/v3/${INFURA_PROJECT_ID}".to_string()
}

fn default_ws_url() -> String {
    "wss://sepolia.infura.io/ws/v3/${INFURA_PROJECT_ID}".to_string()
}

fn default_chain_id() -> u64 {
    11_155_111
}

fn default_account_count() -> u32 {
    1
}

fn default_contract_address() -> String {
    "0x1dE0aB01CCe1784f9864660f102c0470F75356aD".to_string()
}

fn default_transfer_method() -> String {
    "sendEther(address)".to_string()
}

fn default_event_name() -> String {
    "EtherTransfer".to_string()
}

fn default_event_signature() -> String {
    "EtherTransfer(address,address,uint256)".to_string()
}

fn default_gas_limit() -> u64 {
    2_000_000
}

fn default_poll_interval() -> u64 {
    1_000
}

/// Substitutes environment variables in a string.
///
/// Replaces `${VAR_NAME}` patterns with the corresponding environment variable value.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set.
pub fn substitute_env_vars(input: &str) -> ConfigResult<String> {
    let mut result = input.to_string();
    let mut start = 0;

    while let Some(var_start) = result[start..].find("${") {
        let abs_start = start + var_start;
        let Some(var_end) = result[abs_start..].find('}') else {
            break;
        };
        let abs_end = abs_start + var_end;
        let var_name = &result[abs_start + 2..abs_end];

        let var_value = std::env::var(var_name)
            .map_err(|_| ChainConfigError::EnvVarNotSet(var_name.to_string()))?;

        result.replace_range(abs_start..abs_end + 1, &var_value);
        start = abs_start + var_value.len();
    }

    Ok(result)
}
