//! # Domain Errors
//!
//! Typed domain error definitions.
//!
//! This module provides the [`DomainError`] enum for representing
//! domain-level errors with numeric error codes.
//!
//! # Error Code Ranges
//!
//! - **1000-1999**: Validation errors
//! - **4000-4999**: Unit conversion errors
//!
//! # Examples
//!
//! ```
//! use ether_relay::domain::errors::DomainError;
//!
//! let error = DomainError::MissingField("recipient".to_string());
//! assert_eq!(error.code(), 1001);
//! ```

use thiserror::Error;

/// Domain-level error with numeric error codes.
///
/// | Range | Category |
/// |-------|----------|
/// | 1000-1999 | Validation errors |
/// | 4000-4999 | Unit conversion errors |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (1000-1999)
    // ========================================================================
    /// A required request field is empty or missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// The recipient is not a 20-byte hex address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The amount is not a non-negative ether decimal.
    #[error("invalid ether amount: {0}")]
    InvalidAmount(String),

    // ========================================================================
    // Conversion Errors (4000-4999)
    // ========================================================================
    /// Multiplication overflowed 256 bits.
    #[error("arithmetic overflow")]
    Overflow,

    /// A wei value could not be rendered in ether.
    #[error("unit conversion failed: {0}")]
    Conversion(String),
}

impl DomainError {
    /// Returns the numeric error code.
    ///
    /// # Examples
    ///
    /// ```
    /// use ether_relay::domain::errors::DomainError;
    ///
    /// assert_eq!(DomainError::InvalidAmount("x".to_string()).code(), 1003);
    /// assert_eq!(DomainError::Overflow.code(), 4001);
    /// ```
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::MissingField(_) => 1001,
            Self::InvalidAddress(_) => 1002,
            Self::InvalidAmount(_) => 1003,
            Self::Overflow => 4001,
            Self::Conversion(_) => 4002,
        }
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.code() {
            1000..=1999 => "validation",
            4000..=4999 => "conversion",
            _ => "unknown",
        }
    }

    /// Returns true if this is a validation error.
    #[inline]
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self.code(), 1000..=1999)
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
