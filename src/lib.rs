//! # Ether Relay
//!
//! Relays Ether transfers through a deployed contract on behalf of clients
//! and forwards the contract's transfer events to connected subscribers in
//! real time.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Domain Layer** (`domain`): transaction records, ether amounts and contract events
//! - **Application Layer** (`application`): the relay use case and the event bridge
//! - **Infrastructure Layer** (`infrastructure`): the ethers-based chain adapter
//! - **API Layer** (`api`): REST and WebSocket interfaces
//! - **Client** (`client`): the transaction view driven by a relay or a wallet
//!
//! ## Example
//!
//! ```rust,ignore
//! use ether_relay::application::SendEtherUseCase;
//! use ether_relay::domain::entities::TransactionRequest;
//!
//! let result = SendEtherUseCase::new(chain, contract, "sendEther(address)", gas)
//!     .execute(TransactionRequest::new(recipient, "0.5"))
//!     .await?;
//! println!("{}", result.tx_hash());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;
