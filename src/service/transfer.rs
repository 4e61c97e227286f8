//! Transfer eligibility

use crate::domain::{Account, Amount};

/// Whether `from` holds enough to send `amount`. Equality is allowed.
pub fn can_transfer(from: &Account, amount: Amount) -> bool {
    from.balance >= amount.value()
}
