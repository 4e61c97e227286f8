//! Amount type
//!
//! Domain primitive for transfer amounts. Amounts are validated at
//! construction time, so a non-positive amount cannot reach the use case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amount represents a validated, strictly positive integer quantity.
///
/// # Example
/// ```
/// use dsql_transfer::domain::Amount;
///
/// let amount = Amount::new(300).unwrap();
/// assert_eq!(amount.value(), 300);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

/// Errors that can occur when creating an Amount
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(i64),

    #[error("Amount must be an integer (got {0:?})")]
    ParseError(String),
}

impl Amount {
    /// Create a new Amount.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value <= 0 {
            return Err(AmountError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| AmountError::ParseError(s.to_string()))?;
        Amount::new(value)
    }
}

impl TryFrom<i64> for Amount {
    type Error = AmountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_positive() {
        let amount = Amount::new(100);
        assert_eq!(amount.unwrap().value(), 100);
    }

    #[test]
    fn test_amount_zero_rejected() {
        assert_eq!(Amount::new(0), Err(AmountError::NotPositive(0)));
    }

    #[test]
    fn test_amount_negative_rejected() {
        assert_eq!(Amount::new(-300), Err(AmountError::NotPositive(-300)));
    }

    #[test]
    fn test_amount_from_str() {
        let amount: Amount = " 300 ".parse().unwrap();
        assert_eq!(amount.value(), 300);
    }

    #[test]
    fn test_amount_from_str_rejects_non_integer() {
        assert!(matches!("12.5".parse::<Amount>(), Err(AmountError::ParseError(_))));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::ParseError(_))));
        assert!(matches!("-1".parse::<Amount>(), Err(AmountError::NotPositive(-1))));
    }

    #[test]
    fn test_amount_deserialize_validates() {
        let ok: Amount = serde_json::from_str("42").unwrap();
        assert_eq!(ok.value(), 42);

        let err = serde_json::from_str::<Amount>("0");
        assert!(err.is_err());
    }
}
