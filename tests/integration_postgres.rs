//! PostgreSQL adapter tests.
//!
//! These need a database: DATABASE_URL=... cargo test -- --ignored

use dsql_transfer::domain::Amount;
use dsql_transfer::infrastructure::{PgAccountRepository, PgTransferRecordRepository, PgUnitOfWork};
use dsql_transfer::repository::AccountRepository;
use dsql_transfer::{AccountService, AccountUseCase, AppError, RequestContext, UnitOfWork};

mod common;

fn amount(value: i64) -> Amount {
    Amount::new(value).unwrap()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_transfer_commits() {
    let pool = common::setup_test_db(&[("Alice", "Tokyo", 1000), ("Bob", "Osaka", 200)]).await;
    let service = AccountService::new(
        PgUnitOfWork::new(pool.clone()),
        PgAccountRepository::new(),
        PgTransferRecordRepository::new(),
    );

    service
        .transfer(&RequestContext::new(), "Alice", "Bob", amount(300))
        .await
        .unwrap();

    assert_eq!(common::balance_of(&pool, "Alice").await, 700);
    assert_eq!(common::balance_of(&pool, "Bob").await, 500);
    assert_eq!(
        common::transfer_rows(&pool).await,
        vec![("Alice".to_string(), "Bob".to_string(), 300)]
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_rejection_rolls_back() {
    let pool = common::setup_test_db(&[("fromUser", "Tokyo", 100), ("toUser", "Osaka", 200)]).await;
    let service = AccountService::new(
        PgUnitOfWork::new(pool.clone()),
        PgAccountRepository::new(),
        PgTransferRecordRepository::new(),
    );

    let err = service
        .transfer(&RequestContext::new(), "fromUser", "toUser", amount(300))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("insufficient funds"));
    assert_eq!(common::balance_of(&pool, "fromUser").await, 100);
    assert!(common::transfer_rows(&pool).await.is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_error_inside_transaction_discards_update() {
    let pool = common::setup_test_db(&[("Alice", "Tokyo", 1000)]).await;
    let uow = PgUnitOfWork::new(pool.clone());

    let err = uow
        .execute_in_transaction(&RequestContext::new(), |conn| {
            Box::pin(async move {
                PgAccountRepository.update_balance(conn, "Alice", 1).await?;
                PgAccountRepository.update_balance(conn, "Nobody", 1).await
            })
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoRowsAffected(id) if id == "Nobody"));
    assert_eq!(common::balance_of(&pool, "Alice").await, 1000);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_find_missing_account() {
    let pool = common::setup_test_db(&[]).await;
    let uow = PgUnitOfWork::new(pool);

    let err = uow
        .execute(&RequestContext::new(), |conn| {
            Box::pin(async move { PgAccountRepository.find_by_id(conn, "ghost").await })
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AccountNotFound(_)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_malformed_row_is_scan_error() {
    let pool = common::setup_test_db(&[]).await;
    let uow = PgUnitOfWork::new(pool);

    // A temporary table shadows simple_account for this transaction only
    let err = uow
        .execute_in_transaction(&RequestContext::new(), |conn| {
            Box::pin(async move {
                sqlx::query(
                    "CREATE TEMP TABLE simple_account (user_id TEXT, city TEXT, balance TEXT) ON COMMIT DROP",
                )
                .execute(&mut *conn)
                .await?;
                sqlx::query("INSERT INTO simple_account VALUES ('Alice', 'Tokyo', 'lots')")
                    .execute(&mut *conn)
                    .await?;
                PgAccountRepository.find_by_id(conn, "Alice").await
            })
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Scan(_)));
}
