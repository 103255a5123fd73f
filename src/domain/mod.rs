//! # Domain Layer
//!
//! Core types of the relay, free of transport and chain-client concerns.
//!
//! This layer contains:
//! - **Entities**: the transaction request and result records
//! - **Value Objects**: ether amounts and gas pricing
//! - **Events**: contract events forwarded to subscribers
//! - **Errors**: domain-specific error types

pub mod entities;
pub mod errors;
pub mod events;
pub mod value_objects;
