//! # Infrastructure Layer
//!
//! External adapters behind the application's ports.
//!
//! ## Blockchain
//!
//! - [`blockchain::ChainClient`]: accounts, contract invocation, lookups
//! - [`blockchain::ChainEventSource`]: contract event subscription
//! - ethers-rs implementations over HTTP and WebSocket providers

pub mod blockchain;
