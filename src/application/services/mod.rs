//! # Application Services
//!
//! Long-running services that orchestrate domain logic and infrastructure.
//!
//! - [`EventBridge`]: relays contract events to real-time subscribers
//! - [`SubscriberRegistry`]: the set of connected subscribers

pub mod event_bridge;

pub use event_bridge::{EventBridge, SubscriberId, SubscriberRegistry, Subscription};
