//! Transfer record
//!
//! Append-only audit row written once per committed transfer.

use serde::{Deserialize, Serialize};

use super::{Account, Amount};

/// Immutable record of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub from_id: String,
    pub to_id: String,
    pub amount: Amount,
}

impl TransferRecord {
    /// Build the record from the accounts as they were fetched, before any
    /// balance update.
    pub fn new(from: &Account, to: &Account, amount: Amount) -> Self {
        Self {
            from_id: from.id.clone(),
            to_id: to.id.clone(),
            amount,
        }
    }
}

/// Outcome of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub record: TransferRecord,
    pub from_balance: i64,
    pub to_balance: i64,
}
