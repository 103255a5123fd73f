//! # Ether Amount Value Object
//!
//! Conversions between ether decimal strings and wei.
//!
//! This module provides the [`EtherAmount`] type, a wrapper around a
//! [`U256`] wei value that parses from and renders to ether decimal strings,
//! and [`gas_cost`] for pricing a mined transaction.
//!
//! # Examples
//!
//! ```
//! use ether_relay::domain::value_objects::ether::EtherAmount;
//!
//! let amount = EtherAmount::parse("0.5").unwrap();
//! assert_eq!(amount.wei().to_string(), "500000000000000000");
//! assert_eq!(amount.to_ether_string().unwrap(), "0.5");
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use ethers::types::U256;
use ethers::utils::format_units;
use std::fmt;

/// Number of decimals between ether and wei.
pub const ETHER_DECIMALS: usize = 18;

/// A non-negative amount of Ether, stored in wei.
///
/// # Invariants
///
/// - The wei value fits in 256 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EtherAmount(U256);

impl EtherAmount {
    /// Zero ether.
    pub const ZERO: Self = Self(U256::zero());

    /// Parses an ether decimal string such as `"0.5"` or `"12"`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the string is not a plain
    /// non-negative decimal with at most 18 fractional digits, or if its
    /// wei value does not fit in 256 bits.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let trimmed = input.trim();
        let (whole, fraction) = validate_decimal(trimmed)?;
        let too_large = || DomainError::InvalidAmount(format!("{trimmed}: amount too large"));

        let whole = decimal_to_u256(whole).ok_or_else(too_large)?;
        let padded = format!("{fraction:0<width$}", width = ETHER_DECIMALS);
        let fraction = decimal_to_u256(&padded).ok_or_else(too_large)?;

        whole
            .checked_mul(U256::exp10(ETHER_DECIMALS))
            .and_then(|wei| wei.checked_add(fraction))
            .map(Self)
            .ok_or_else(too_large)
    }

    /// Creates an amount from a wei value.
    #[inline]
    #[must_use]
    pub const fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    /// Returns the amount in wei.
    #[inline]
    #[must_use]
    pub const fn wei(&self) -> U256 {
        self.0
    }

    /// Returns true if the amount is zero.
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Renders the amount as an ether decimal without trailing zeros.
    ///
    /// `21_000 gwei` renders as `"0.000021"`, one ether as `"1"`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Conversion` if the value cannot be formatted.
    pub fn to_ether_string(&self) -> DomainResult<String> {
        let formatted = format_units(self.0, "ether")
            .map_err(|e| DomainError::Conversion(e.to_string()))?;
        Ok(trim_fraction(&formatted))
    }
}

impl fmt::Display for EtherAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_ether_string() {
            Ok(ether) => write!(f, "{ether} ETH"),
            Err(_) => write!(f, "{} wei", self.0),
        }
    }
}

/// Computes the fee paid for a transaction: `gas_used × gas_price`.
///
/// # Errors
///
/// Returns `DomainError::Overflow` if the product exceeds 256 bits.
pub fn gas_cost(gas_used: U256, gas_price: U256) -> DomainResult<EtherAmount> {
    gas_used
        .checked_mul(gas_price)
        .map(EtherAmount::from_wei)
        .ok_or(DomainError::Overflow)
}

/// Splits a decimal into its whole and fractional digits.
fn validate_decimal(input: &str) -> DomainResult<(&str, &str)> {
    if input.is_empty() {
        return Err(DomainError::InvalidAmount("amount is empty".to_string()));
    }

    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (input, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.is_none_or(all_digits) {
        return Err(DomainError::InvalidAmount(format!(
            "{input}: expected a non-negative decimal"
        )));
    }
    if whole.is_empty() && fraction.is_none_or(str::is_empty) {
        return Err(DomainError::InvalidAmount(format!("{input}: no digits")));
    }
    if fraction.is_some_and(|f| f.len() > ETHER_DECIMALS) {
        return Err(DomainError::InvalidAmount(format!(
            "{input}: more than {ETHER_DECIMALS} decimal places"
        )));
    }

    Ok((whole, fraction.unwrap_or_default()))
}

/// Parses a digit string, returning `None` if it exceeds 256 bits.
fn decimal_to_u256(digits: &str) -> Option<U256> {
    if digits.is_empty() {
        return Some(U256::zero());
    }
    U256::from_dec_str(digits).ok()
}

fn trim_fraction(formatted: &str) -> String {
    if !formatted.contains('.') {
        return formatted.to_string();
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
