//! Money value object backed by an arbitrary-precision decimal.
//!
//! Amounts are kept in major units (e.g. `1500.50`). Payment gateways expect
//! integer minor units, so conversion rounds half-up at the cent boundary.

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// A non-negative amount of money in major units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(BigDecimal);

impl Money {
    /// Creates a money amount, rejecting negative values.
    pub fn new(amount: BigDecimal) -> Result<Self, ValidationError> {
        if amount < BigDecimal::zero() {
            return Err(ValidationError::invalid_format(
                "amount",
                "amount cannot be negative",
            ));
        }
        Ok(Self(amount))
    }

    /// A zero amount.
    pub fn zero() -> Self {
        Self(BigDecimal::zero())
    }

    /// Builds an amount from integer minor units (e.g. kobo, cents).
    pub fn from_minor_units(minor: i64) -> Result<Self, ValidationError> {
        Self::new(BigDecimal::from(minor) / BigDecimal::from(100))
    }

    /// Returns the decimal amount.
    pub fn amount(&self) -> &BigDecimal {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiplies a unit price by a quantity.
    pub fn times(&self, quantity: u32) -> Money {
        Money(&self.0 * BigDecimal::from(quantity))
    }

    /// Converts to integer minor units, rounding half-up.
    ///
    /// `10.005` becomes `1001`, `10.004` becomes `1000`.
    pub fn to_minor_units(&self) -> Result<i64, ValidationError> {
        let half = BigDecimal::from(1) / BigDecimal::from(2);
        let scaled = &self.0 * BigDecimal::from(100) + half;
        scaled.with_scale(0).to_i64().ok_or_else(|| {
            ValidationError::invalid_format("amount", "amount exceeds minor unit range")
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.with_scale(2))
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = BigDecimal::from_str(s.trim())
            .map_err(|e| ValidationError::invalid_format("amount", e.to_string()))?;
        Self::new(amount)
    }
}
