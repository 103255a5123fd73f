//! # Domain Errors
//!
//! Typed error types for domain operations.
//!
//! Error codes are organized by category:
//! - 1000-1999: Validation errors
//! - 4000-4999: Unit conversion errors
//!
//! # Examples
//!
//! ```
//! use ether_relay::domain::errors::{DomainError, DomainResult};
//!
//! fn require(value: &str) -> DomainResult<&str> {
//!     if value.is_empty() {
//!         return Err(DomainError::MissingField("value".to_string()));
//!     }
//!     Ok(value)
//! }
//! assert!(require("").is_err());
//! ```

pub mod domain_error;

pub use domain_error::{DomainError, DomainResult};
