use async_trait::async_trait;

use crate::domain::TransferRecord;
use crate::error::AppResult;

/// Append-only audit trail of completed transfers.
#[async_trait]
pub trait TransferRecordRepository<H: Send>: Send + Sync {
    /// Insert one record. Any write failure is `AppError::Persistence`.
    async fn insert(&self, handle: &mut H, record: &TransferRecord) -> AppResult<()>;
}
