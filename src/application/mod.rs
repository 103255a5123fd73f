//! # Application Layer
//!
//! Use case orchestration and application services.
//!
//! This layer coordinates domain objects and chain adapters to relay
//! transactions and contract events.
//!
//! ## Use Cases
//!
//! - [`SendEtherUseCase`]: relay an Ether transfer through the contract
//!
//! ## Services
//!
//! - [`EventBridge`]: forward contract events to subscribers
//! - [`SubscriberRegistry`]: connected real-time subscribers

pub mod error;
pub mod services;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
pub use services::{EventBridge, SubscriberId, SubscriberRegistry, Subscription};
pub use use_cases::SendEtherUseCase;
