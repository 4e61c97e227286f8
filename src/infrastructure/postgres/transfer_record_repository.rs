use async_trait::async_trait;
use sqlx::PgConnection;

use crate::domain::TransferRecord;
use crate::error::{AppError, AppResult};
use crate::repository::TransferRecordRepository;

/// Transfer audit rows stored in `simple_transaction`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgTransferRecordRepository;

impl PgTransferRecordRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransferRecordRepository<PgConnection> for PgTransferRecordRepository {
    async fn insert(&self, handle: &mut PgConnection, record: &TransferRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO simple_transaction (from_id, to_id, amount)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&record.from_id)
        .bind(&record.to_id)
        .bind(record.amount.value())
        .execute(&mut *handle)
        .await
        .map_err(|e| AppError::Persistence(e.to_string()))?;

        Ok(())
    }
}
