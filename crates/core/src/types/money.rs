//! Non-negative monetary amounts using decimal arithmetic.
//!
//! Amounts are always in the store's local currency; a store never prices
//! delivery in more than one currency, so no currency code is carried.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing [`Money`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount must not be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative amount of money.
///
/// Serialized as a decimal string (e.g. `"200.00"`) so that no precision is
/// lost in JSON.
///
/// ```
/// use bloom_core::Money;
/// use rust_decimal::Decimal;
///
/// let fee = Money::new(Decimal::new(20000, 2)).unwrap();
/// assert_eq!(fee.to_string(), "200.00");
/// assert!(Money::new(Decimal::NEGATIVE_ONE).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new amount.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create an amount from whole currency units.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtract `other`, returning `None` if the result would be negative.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0
            .checked_sub(other.0)
            .and_then(|amount| Self::new(amount).ok())
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
