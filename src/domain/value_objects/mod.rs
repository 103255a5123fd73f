//! # Value Objects
//!
//! Immutable types with validation.

pub mod ether;


pub use ether::{EtherAmount, gas_cost};
