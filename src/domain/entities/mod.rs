//! # Domain Entities
//!
//! Request and result records exchanged with relay clients.

pub mod transaction;

pub use transaction::{TransactionRequest, TransactionResult};
