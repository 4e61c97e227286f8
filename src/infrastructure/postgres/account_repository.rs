use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};

use crate::domain::Account;
use crate::error::{AppError, AppResult};
use crate::repository::AccountRepository;

/// Accounts stored in `simple_account`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgAccountRepository;

impl PgAccountRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AccountRepository<PgConnection> for PgAccountRepository {
    async fn find_by_id(&self, handle: &mut PgConnection, id: &str) -> AppResult<Account> {
        let row = sqlx::query(
            r#"
            SELECT user_id, city, balance
            FROM simple_account
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *handle)
        .await?;

        let row = row.ok_or_else(|| AppError::AccountNotFound(id.to_string()))?;
        account_from_row(&row)
    }

    async fn update_balance(&self, handle: &mut PgConnection, id: &str, balance: i64) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE simple_account
            SET balance = $1
            WHERE user_id = $2
            "#,
        )
        .bind(balance)
        .bind(id)
        .execute(&mut *handle)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NoRowsAffected(id.to_string()));
        }

        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> AppResult<Account> {
    let scan = |e: sqlx::Error| AppError::Scan(e.to_string());

    Ok(Account {
        id: row.try_get("user_id").map_err(scan)?,
        location: row.try_get("city").map_err(scan)?,
        balance: row.try_get("balance").map_err(scan)?,
    })
}
