//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

use super::AmountError;

/// Business rule violations raised by the transfer use case itself.
///
/// Every variant is a rejection: retrying the same request against the
/// same state yields the same answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Source balance does not cover the requested amount
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    /// Amount is zero, negative or not an integer
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Transfer to same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    /// Crediting the destination would overflow its balance
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(requested: i64, available: i64) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }
}
