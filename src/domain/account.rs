//! Account entity

use serde::{Deserialize, Serialize};

/// A balance-holding account, keyed by its user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub location: String,
    pub balance: i64,
}

impl Account {
    pub fn new(id: impl Into<String>, location: impl Into<String>, balance: i64) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            balance,
        }
    }
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UserID: {}; City: {}; Balance: {}",
            self.id, self.location, self.balance
        )
    }
}
