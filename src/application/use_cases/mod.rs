//! # Use Cases
//!
//! Application use cases implementing the relay workflow.

pub mod send_ether;


pub use send_ether::SendEtherUseCase;
