//! Product price.
//!
//! Prices are stored as `DOUBLE PRECISION` and displayed in rupees. The
//! newtype only guarantees the value is finite and non-negative.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must be a finite number")]
    NotFinite,
    #[error("price cannot be negative")]
    Negative,
}

/// A non-negative, finite product price.
///
/// ```
/// use merch_core::Price;
///
/// let price = Price::new(1299.5).unwrap();
/// assert_eq!(price.to_string(), "₹1299.50");
/// assert!(Price::new(-1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    /// Currency symbol used for display.
    pub const SYMBOL: &'static str = "₹";

    /// Create a price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] for NaN, infinite or negative amounts.
    pub fn new(amount: f64) -> Result<Self, PriceError> {
        if !amount.is_finite() {
            return Err(PriceError::NotFinite);
        }
        if amount < 0.0 {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The raw amount.
    #[must_use]
    pub const fn amount(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Price {
    type Error = PriceError;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for f64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", Self::SYMBOL, self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_amounts() {
        assert_eq!(Price::new(f64::NAN), Err(PriceError::NotFinite));
        assert_eq!(Price::new(f64::INFINITY), Err(PriceError::NotFinite));
        assert_eq!(Price::new(-0.01), Err(PriceError::Negative));
    }

    #[test]
    fn test_zero_is_allowed() {
        assert_eq!(Price::new(0.0).unwrap().to_string(), "₹0.00");
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Price>("-5.0").is_err());
        let price: Price = serde_json::from_str("49.9").unwrap();
        assert!((price.amount() - 49.9).abs() < f64::EPSILON);
    }
}
