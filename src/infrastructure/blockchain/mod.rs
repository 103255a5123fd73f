//! # Blockchain Clients
//!
//! Chain client adapter and contract event source.

pub mod client;
pub mod config;
pub mod ethereum;

pub use client::{
    ChainClient, ChainError, ChainEventSource, ChainResult, ContractCall, EventFilterSpec,
    EventStream,
};
pub use config::{ChainConfig, ChainConfigError};
pub use ethereum::{EthersChainClient, EthersEventSource};
