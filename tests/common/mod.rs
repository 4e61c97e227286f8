//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use dsql_transfer::infrastructure::{
    MemoryAccountRepository, MemoryDatabase, MemoryTransferRecordRepository, MemoryUnitOfWork,
};
use dsql_transfer::{Account, AccountService, AccountUseCase};

pub type MemoryService =
    AccountService<MemoryUnitOfWork, MemoryAccountRepository, MemoryTransferRecordRepository>;

/// In-memory store seeded with the given `(id, city, balance)` rows
pub fn seeded_db(accounts: &[(&str, &str, i64)]) -> MemoryDatabase {
    let db = MemoryDatabase::new();
    for (id, city, balance) in accounts {
        db.seed(Account::new(*id, *city, *balance));
    }
    db
}

pub fn memory_service(db: &MemoryDatabase) -> MemoryService {
    AccountService::new(
        MemoryUnitOfWork::new(db.clone()),
        MemoryAccountRepository,
        MemoryTransferRecordRepository,
    )
}

pub fn shared_memory_service(db: &MemoryDatabase) -> Arc<dyn AccountUseCase> {
    Arc::new(memory_service(db))
}

/// Setup test database - recreate tables and seed accounts
pub async fn setup_test_db(accounts: &[(&str, &str, i64)]) -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS simple_account (
            user_id TEXT PRIMARY KEY,
            city TEXT NOT NULL,
            balance BIGINT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create simple_account");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS simple_transaction (
            from_id TEXT NOT NULL,
            to_id TEXT NOT NULL,
            amount BIGINT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create simple_transaction");

    let mut tx = pool.begin().await.expect("Failed to begin transaction");

    // Clean up DB for fresh state
    sqlx::query("DELETE FROM simple_transaction")
        .execute(&mut *tx)
        .await
        .expect("Failed to clean up transfers");
    sqlx::query("DELETE FROM simple_account")
        .execute(&mut *tx)
        .await
        .expect("Failed to clean up accounts");

    for (id, city, balance) in accounts {
        sqlx::query("INSERT INTO simple_account (user_id, city, balance) VALUES ($1, $2, $3)")
            .bind(*id)
            .bind(*city)
            .bind(*balance)
            .execute(&mut *tx)
            .await
            .expect("Failed to seed account");
    }

    tx.commit().await.expect("Failed to commit transaction");

    pool
}

/// Persisted transfer rows as `(from_id, to_id, amount)`
pub async fn transfer_rows(pool: &PgPool) -> Vec<(String, String, i64)> {
    sqlx::query_as("SELECT from_id, to_id, amount FROM simple_transaction")
        .fetch_all(pool)
        .await
        .expect("Failed to read transfers")
}

pub async fn balance_of(pool: &PgPool, id: &str) -> i64 {
    sqlx::query_scalar("SELECT balance FROM simple_account WHERE user_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to read balance")
}
