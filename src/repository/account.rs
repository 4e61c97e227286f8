use async_trait::async_trait;

use crate::domain::Account;
use crate::error::AppResult;

/// Account data access, generic over the unit-of-work handle `H`.
#[async_trait]
pub trait AccountRepository<H: Send>: Send + Sync {
    /// Fetch one account.
    ///
    /// # Errors
    /// - `AppError::AccountNotFound` when no row matches
    /// - `AppError::Scan` when the row cannot be decoded
    async fn find_by_id(&self, handle: &mut H, id: &str) -> AppResult<Account>;

    /// Overwrite the stored balance with an absolute value.
    ///
    /// # Errors
    /// - `AppError::NoRowsAffected` when `id` matches no row
    async fn update_balance(&self, handle: &mut H, id: &str, balance: i64) -> AppResult<()>;
}
